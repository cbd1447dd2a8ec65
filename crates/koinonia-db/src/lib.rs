//! Koinonia Database Layer.
//!
//! SQLite persistence for the cell-church management system. Every table is
//! tenant-scoped: queries take an explicit `tenant_id` and filter on it.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult};

use std::path::Path;

/// Open (or create) the database at `path` and bring the schema up to date.
pub fn init_pool(path: &Path) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
