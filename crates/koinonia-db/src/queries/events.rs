//! Consolidation event queries.
//!
//! The event log is append-only: there is deliberately no update or delete
//! here. Events are the sole input to risk scoring.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;

/// Consolidation event row from database.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: String,
    pub tenant_id: String,
    pub convert_id: String,
    pub event_type: String,
    pub description: Option<String>,
    pub metadata: Option<String>,
    pub created_at: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        convert_id: row.get(2)?,
        event_type: row.get(3)?,
        description: row.get(4)?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Append an event and bump the convert's last activity, in one transaction.
pub fn insert_event(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    convert_id: &str,
    event_type: &str,
    description: Option<&str>,
    metadata: Option<&str>,
) -> DbResult<()> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO consolidation_events (id, tenant_id, convert_id, event_type,
                                               description, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, tenant_id, convert_id, event_type, description, metadata],
        )?;

        let changed = tx.execute(
            "UPDATE new_converts SET last_activity_at = datetime('now'), updated_at = datetime('now')
             WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, convert_id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Convert: {}", convert_id)));
        }

        tx.commit()?;
        Ok(())
    })
}

/// Get an event by ID.
pub fn get_event(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<EventRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT id, tenant_id, convert_id, event_type, description, metadata, created_at
             FROM consolidation_events WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Event: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// List a convert's events, newest first.
pub fn list_events(pool: &DbPool, tenant_id: &str, convert_id: &str) -> DbResult<Vec<EventRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, convert_id, event_type, description, metadata, created_at
             FROM consolidation_events WHERE tenant_id = ?1 AND convert_id = ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![tenant_id, convert_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Count a convert's events of a given type.
pub fn count_events_by_type(
    pool: &DbPool,
    tenant_id: &str,
    convert_id: &str,
    event_type: &str,
) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM consolidation_events
             WHERE tenant_id = ?1 AND convert_id = ?2 AND event_type = ?3",
            params![tenant_id, convert_id, event_type],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}
