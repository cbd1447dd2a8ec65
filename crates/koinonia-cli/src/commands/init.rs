//! Database initialization command.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn execute(data_dir: &Path) -> Result<()> {
    let path = super::db_path(data_dir);
    koinonia_db::init_pool(&path)?;
    println!("{} Database ready at {}", "✓".green().bold(), path.display());
    Ok(())
}
