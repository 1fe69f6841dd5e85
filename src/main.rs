//! Binary entry point: resolve configuration, open the catalog, and hand the
//! store to whichever front end was requested.
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use book_catalog::{logging, run_app, run_console, App, BookStore, Config};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "book-catalog")]
#[command(about = "Keep a personal library catalog in a plain text file")]
#[command(version)]
struct Cli {
    /// Catalog file to use instead of the configured one
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and edit the catalog in a terminal UI (default)
    Tui,
    /// Numbered menu on standard input/output
    Console,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(file) = cli.file {
        config.catalog_file = file;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config);

    let store = BookStore::open(&config.catalog_file)
        .with_context(|| format!("could not load {}", config.catalog_file.display()))?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let mut app = App::new(store);
            run_app(&mut app)?;
            app.into_store().close()?;
        }
        Commands::Console => {
            let mut store = store;
            run_console(&mut store, io::stdin().lock(), io::stdout())?;
            store.close()?;
        }
    }

    info!("exiting");
    Ok(())
}
