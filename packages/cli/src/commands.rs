use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Subcommand;
use console::style;
use registry::{FileDetails, FileId, RawFile, RegistryEvent};
use tracing::instrument;

use crate::session::Session;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add one or more files
    Add {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// List all files, oldest first
    List,
    /// Show details for one file
    Show {
        /// File id or a unique prefix of it
        id: String,
    },
    /// Delete one file
    Remove { id: String },
    /// Delete every file
    Clear,
    /// Save a file's content to disk
    Download {
        id: String,
        /// Destination directory (default: the configured download dir)
        #[arg(long, value_name = "DIR")]
        to: Option<PathBuf>,
    },
    /// Run several commands in one session
    Shell,
}

/// Run one command against the session and print its result.
#[instrument(skip(session, out))]
pub fn execute(session: &mut Session, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Add { paths } => add(session, &paths, out)?,
        Command::List => list(session, out)?,
        Command::Show { id } => show(session, &session.resolve_id(&id), out)?,
        Command::Remove { id } => {
            let id = session.resolve_id(&id);
            if !session.registry_mut().remove(&id)? {
                writeln!(out, "{}", style(format!("No file with id {id}")).dim())?;
            }
        }
        Command::Clear => {
            if session.registry_mut().remove_all()? == 0 {
                writeln!(out, "{}", style("Nothing to delete").dim())?;
            }
        }
        Command::Download { id, to } => {
            let id = session.resolve_id(&id);
            let dest = to.unwrap_or_else(|| session.download_dir().to_path_buf());
            let path = session.registry_mut().download(&id, &dest)?;
            writeln!(out, "Saved to {}", path.display())?;
        }
        Command::Shell => bail!("Already in a shell"),
    }

    print_events(&session.drain_events(), out)
}

fn add(session: &mut Session, paths: &[PathBuf], out: &mut dyn Write) -> Result<()> {
    let files = paths
        .iter()
        .map(|path| {
            RawFile::from_path(path).with_context(|| format!("Cannot read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let ids = session.registry_mut().add(files)?;
    for id in &ids {
        if let Some(record) = session.registry().get(id) {
            writeln!(out, "{}  {}", style(id).cyan(), record.name())?;
        }
    }
    Ok(())
}

fn list(session: &Session, out: &mut dyn Write) -> Result<()> {
    let files = session.registry().files();
    if files.is_empty() {
        writeln!(out, "{}", style("No files yet").bold())?;
        writeln!(out, "{}", style("Upload files to see them here.").dim())?;
        return Ok(());
    }

    let now = Utc::now();
    for record in files {
        let details = FileDetails::describe(record, now);
        writeln!(out, "{}  {}", style(&details.id).cyan(), style(&details.name).bold())?;
        writeln!(
            out,
            "    {} · {} · {}{}",
            details.kind.label(),
            details.size,
            details.created,
            availability(&details),
        )?;
    }
    Ok(())
}

fn show(session: &Session, id: &FileId, out: &mut dyn Write) -> Result<()> {
    let Some(record) = session.registry().get(id) else {
        bail!("File not found: {id}");
    };
    let details = FileDetails::describe(record, Utc::now());

    writeln!(out, "{}", style(&details.name).bold())?;
    writeln!(out, "  id       {}", details.id)?;
    writeln!(out, "  type     {}", details.mime_type)?;
    writeln!(out, "  size     {}", details.size)?;
    writeln!(out, "  added    {}", details.created)?;
    match record.blob_url() {
        Some(url) => writeln!(out, "  content  {url}")?,
        None => writeln!(out, "  content  {}", style("unavailable in this session").yellow())?,
    }
    if details.previewable {
        writeln!(out, "  preview  {}", details.kind.label())?;
    }
    Ok(())
}

fn availability(details: &FileDetails) -> String {
    if details.available {
        String::new()
    } else {
        format!(" · {}", style("unavailable").yellow())
    }
}

fn print_events(events: &[RegistryEvent], out: &mut dyn Write) -> Result<()> {
    for event in events {
        let title = if event.is_destructive() {
            style(event.title()).red().bold()
        } else {
            style(event.title()).green().bold()
        };
        writeln!(out, "{title}  {}", style(event.description()).dim())?;
    }
    Ok(())
}
