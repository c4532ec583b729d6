use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing::{debug, warn};

use crate::commands::{self, Command};
use crate::session::Session;

/// One line typed at the shell prompt.
#[derive(Debug, Parser)]
#[command(name = "filedrop", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Registry(Command),
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Read commands from `input` until `exit` or end of input.
///
/// Errors from individual commands are printed and the loop continues.
pub fn run(session: &mut Session, input: impl BufRead, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{}",
        style("Type `help` for commands, `exit` to quit.").dim()
    )?;

    let mut lines = input.lines();
    loop {
        write!(out, "{} ", style(">").cyan().bold())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("Failed to read command")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(words) = shlex::split(line) else {
            writeln!(out, "{} unbalanced quotes", style("error:").red().bold())?;
            continue;
        };

        match ShellLine::try_parse_from(words) {
            Ok(ShellLine {
                command: ShellCommand::Exit,
            }) => break,
            Ok(ShellLine {
                command: ShellCommand::Registry(Command::Shell),
            }) => writeln!(out, "{}", style("Already in a shell").dim())?,
            Ok(ShellLine {
                command: ShellCommand::Registry(command),
            }) => {
                if let Err(err) = commands::execute(session, command, out) {
                    warn!(error = %err, "Command failed");
                    writeln!(out, "{} {err:#}", style("error:").red().bold())?;
                }
            }
            // Usage errors and `help` output both arrive here.
            Err(err) => write!(out, "{err}")?,
        }
    }

    debug!("Shell closed");
    Ok(())
}
