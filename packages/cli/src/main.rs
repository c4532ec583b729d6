mod commands;
mod config;
mod session;
mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use commands::Command;
use session::Session;
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "filedrop", version, about = "Keep a list of files and their content for this session")]
struct Cli {
    /// Data directory (overrides configuration)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::AppConfig::load().context("Failed to load config")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    let level = match cli.verbose {
        0 => config.log.max_level().context("Invalid log configuration")?,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut session = Session::open(&config.storage, &config.download.dir)?;
    info!(files = session.registry().len(), "Registry ready");

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Shell => shell::run(&mut session, io::stdin().lock(), &mut stdout),
        command => commands::execute(&mut session, command, &mut stdout),
    }
}
