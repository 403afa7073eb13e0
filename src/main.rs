mod client;
mod commands;
mod manager;
mod notify;
mod sync;
mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use calsel_core::config::CalselConfig;

#[derive(Parser)]
#[command(name = "calsel")]
#[command(about = "Save and restore calendar visibility presets")]
struct Cli {
    /// Host bridge to drive (overrides the configured default)
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable calendars matching a name pattern (case insensitive)
    Enable { pattern: String },
    /// Capture the current selection as a named preset
    Save { name: String },
    /// Re-apply the most recent autosaved selection
    Restore,
    /// Autosave the current selection, then disable every calendar
    Clear,
    /// List, apply, or delete presets
    Presets {
        #[command(subcommand)]
        command: PresetsCommand,
    },
    /// Install presets from a JSON export
    Import {
        /// Path to the export; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print all presets as JSON
    Export,
    /// Compare host and service preset state
    Status,
    /// Keep the session synchronized until interrupted
    Watch,
}

#[derive(Subcommand)]
enum PresetsCommand {
    List,
    /// Autosave the current selection, then apply the named preset
    Select { name: String },
    Delete { name: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = CalselConfig::load()?;

    match cli.command {
        Commands::Enable { pattern } => {
            let session = commands::open_session(&config, cli.host).await?;
            commands::enable::run(&session, &pattern).await
        }
        Commands::Save { name } => {
            let mut session = commands::open_session(&config, cli.host).await?;
            commands::save::run(&mut session, &name).await
        }
        Commands::Restore => {
            let session = commands::open_session(&config, cli.host).await?;
            commands::restore::run(&session).await
        }
        Commands::Clear => {
            let mut session = commands::open_session(&config, cli.host).await?;
            commands::clear::run(&mut session).await
        }
        Commands::Presets { command } => {
            let mut session = commands::open_session(&config, cli.host).await?;
            match command {
                PresetsCommand::List => commands::presets::list(&session).await,
                PresetsCommand::Select { name } => {
                    commands::presets::select(&mut session, &name).await
                }
                PresetsCommand::Delete { name } => {
                    commands::presets::delete(&mut session, &name).await
                }
            }
        }
        Commands::Import { file } => {
            let mut session = commands::open_session(&config, cli.host).await?;
            commands::import::run(&mut session, file.as_deref()).await
        }
        Commands::Export => {
            let session = commands::open_session(&config, cli.host).await?;
            commands::export::run(&session).await
        }
        Commands::Status => {
            let session = commands::open_session(&config, cli.host).await?;
            commands::status::run(&session).await
        }
        Commands::Watch => commands::watch::run(&config, cli.host).await,
    }
}
