//! Web server command.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "3690")]
    pub port: u16,

    /// Also log to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to <data-dir>/serve.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, data_dir: &Path) -> Result<()> {
    let pool = koinonia_db::init_pool(&super::db_path(data_dir))?;
    koinonia_web::run_server(Arc::new(pool), args.port).await
}
