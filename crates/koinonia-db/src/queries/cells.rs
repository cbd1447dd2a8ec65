//! Cell database queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;

/// Cell row from database.
#[derive(Debug, Clone)]
pub struct CellRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub supervision_id: Option<String>,
    pub leader_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CellRow> {
    Ok(CellRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        supervision_id: row.get(3)?,
        leader_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Create a new cell.
pub fn create_cell(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    name: &str,
    supervision_id: Option<&str>,
    leader_id: Option<&str>,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO cells (id, tenant_id, name, supervision_id, leader_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, tenant_id, name, supervision_id, leader_id],
        )?;
        Ok(())
    })
}

/// Get a cell by ID.
pub fn get_cell(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<CellRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT id, tenant_id, name, supervision_id, leader_id, created_at, updated_at
             FROM cells WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Cell: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// List all cells for a tenant.
pub fn list_cells(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<CellRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, name, supervision_id, leader_id, created_at, updated_at
             FROM cells WHERE tenant_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![tenant_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// List the cells under a supervision.
pub fn list_cells_by_supervision(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
) -> DbResult<Vec<CellRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, name, supervision_id, leader_id, created_at, updated_at
             FROM cells WHERE tenant_id = ?1 AND supervision_id = ?2 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![tenant_id, supervision_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Add a person to a cell.
pub fn add_member(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    cell_id: &str,
    person_id: &str,
    role: &str,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO cell_members (id, tenant_id, cell_id, person_id, role)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, tenant_id, cell_id, person_id, role],
        )?;
        Ok(())
    })
}

/// Count members of a cell.
pub fn count_members(pool: &DbPool, tenant_id: &str, cell_id: &str) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM cell_members WHERE tenant_id = ?1 AND cell_id = ?2",
            params![tenant_id, cell_id],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}
