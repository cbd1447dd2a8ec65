//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod cell;
pub mod consolidation;
pub mod init;
pub mod serve;
pub mod supervision;

/// Koinonia - cell-church management
#[derive(Parser)]
#[command(name = "koinonia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the database (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Tenant (church/organization) identifier
    #[arg(short, long, global = true, default_value = "default", env = "KOINONIA_TENANT")]
    pub tenant: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and run migrations
    Init,

    /// Run the web server
    Serve(serve::ServeArgs),

    /// Consolidation: new-convert follow-up
    #[command(subcommand)]
    Consolidation(consolidation::ConsolidationCommands),

    /// Cell management
    #[command(subcommand)]
    Cell(cell::CellCommands),

    /// Supervision health and alerts
    #[command(subcommand)]
    Supervision(supervision::SupervisionCommands),
}

/// Database path inside the data directory.
pub fn db_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("koinonia.db")
}

/// Dispatch the parsed command.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::execute(&cli.data_dir),
        Commands::Serve(args) => serve::execute(args, &cli.data_dir).await,
        Commands::Consolidation(cmd) => consolidation::execute(cmd, &cli.data_dir, &cli.tenant),
        Commands::Cell(cmd) => cell::execute(cmd, &cli.data_dir, &cli.tenant),
        Commands::Supervision(cmd) => supervision::execute(cmd, &cli.data_dir, &cli.tenant),
    }
}
