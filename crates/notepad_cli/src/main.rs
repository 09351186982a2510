//! Command-line front end over the notes core.
//!
//! # Responsibility
//! - Run list/show/add/edit/rm against a local notes database.
//! - Print user-visible outcomes and the change events they produced.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossbeam::channel::{unbounded, Receiver};
use log::info;
use notepad_core::{
    contract, init_logging, ChangeEvent, NoteProvider, NoteService, NoteStore, NoteValues,
    NotepadConfig, SaveOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "notepad")]
#[command(about = "Notepad - inspect and edit the local notes store", long_about = None)]
struct Cli {
    /// Database file (overrides NOTEPAD_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every note in creation order
    List,
    /// Print one note
    Show { id: i64 },
    /// Create a note
    Add { title: String, body: String },
    /// Change the title and/or body of a note
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete a note
    Rm { id: i64 },
    /// Print the content type of a resource identifier
    Type { uri: String },
    /// Check core linkage
    Ping,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = NotepadConfig::from_env().context("failed to read configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())
            .context("failed to start logging")?;
    }

    let (events_tx, events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(
        config.authority.clone(),
        Arc::new(NoteStore::file(&config.db_path)),
        Arc::new(events_tx),
    );
    let service = NoteService::new(Arc::new(provider));
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command {
        Commands::List => {
            let notes = service.list_notes()?;
            if notes.is_empty() {
                println!("No notes.");
            }
            for note in notes {
                println!("{:>5}  {}", note.id, note.display_title());
            }
        }
        Commands::Show { id } => {
            let Some(note) = service.get_note(id)? else {
                bail!("note {id} not found");
            };
            println!("id:    {}", note.id);
            println!("title: {}", note.display_title());
            println!();
            println!("{}", note.body);
        }
        Commands::Add { title, body } => {
            let outcome = service.create_note(&title, &body)?;
            match outcome {
                SaveOutcome::Created(id) => println!("{} (id={id})", outcome.message()),
                SaveOutcome::Skipped => println!("Nothing to save."),
                SaveOutcome::Failed => bail!(outcome.message()),
                SaveOutcome::Updated => println!("{}", outcome.message()),
            }
        }
        Commands::Edit { id, title, body } => {
            let mut values = NoteValues::new();
            if let Some(title) = &title {
                values.put(contract::COLUMN_TITLE, title.trim());
            }
            if let Some(body) = &body {
                values.put(contract::COLUMN_BODY, body.trim());
            }
            if values.is_empty() {
                bail!("nothing to change; pass --title and/or --body");
            }

            let provider = service.provider();
            let uri = contract::item_uri(provider.authority(), id);
            if provider.update(&uri, &values, None)? == 0 {
                bail!(SaveOutcome::Failed.message());
            }
            println!("{}", SaveOutcome::Updated.message());
        }
        Commands::Rm { id } => {
            let outcome = service.delete_note(id)?;
            println!("{}", outcome.message());
        }
        Commands::Type { uri } => {
            println!("{}", service.provider().get_type(&uri)?);
        }
        Commands::Ping => {
            println!("notepad_core ping={}", notepad_core::ping());
            println!("notepad_core version={}", notepad_core::core_version());
        }
    }

    print_change_events(&events);
    Ok(())
}

fn print_change_events(events: &Receiver<ChangeEvent>) {
    for event in events.try_iter() {
        println!(
            "changed: {:?} {} rows={}",
            event.kind, event.uri, event.rows
        );
    }
}
