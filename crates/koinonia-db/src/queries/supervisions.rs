//! Supervision database queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;
use uuid::Uuid;

/// Supervision row from database.
#[derive(Debug, Clone)]
pub struct SupervisionRow {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SupervisionRow> {
    Ok(SupervisionRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        parent_id: row.get(3)?,
        supervisor_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Create a supervision.
pub fn create_supervision(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    name: &str,
    parent_id: Option<&str>,
    supervisor_id: Option<&str>,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO supervisions (id, tenant_id, name, parent_id, supervisor_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, tenant_id, name, parent_id, supervisor_id],
        )?;
        Ok(())
    })
}

/// Get a supervision by ID.
pub fn get_supervision(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<SupervisionRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT id, tenant_id, name, parent_id, supervisor_id, created_at, updated_at
             FROM supervisions WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("Supervision: {}", id))
            }
            e => DbError::Connection(e),
        })
    })
}

/// List supervisions for a tenant.
pub fn list_supervisions(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<SupervisionRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, name, parent_id, supervisor_id, created_at, updated_at
             FROM supervisions WHERE tenant_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![tenant_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Record a supervisor's visit to a cell.
#[allow(clippy::too_many_arguments)]
pub fn insert_visit(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    supervision_id: &str,
    cell_id: &str,
    visitor_id: Option<&str>,
    visit_date: &str,
    notes: Option<&str>,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO supervision_visits (id, tenant_id, supervision_id, cell_id,
                                             visitor_id, visit_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, tenant_id, supervision_id, cell_id, visitor_id, visit_date, notes],
        )?;
        Ok(())
    })
}

/// Insert a supervision-level meeting with its attendance in one transaction.
pub fn insert_supervision_meeting(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    supervision_id: &str,
    meeting_date: &str,
    agenda: Option<&str>,
    attendance: &[(String, bool)],
) -> DbResult<()> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO supervision_meetings (id, tenant_id, supervision_id, meeting_date, agenda)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, tenant_id, supervision_id, meeting_date, agenda],
        )?;

        for (person_id, present) in attendance {
            tx.execute(
                "INSERT INTO supervision_meeting_attendance (id, tenant_id, meeting_id,
                                                             person_id, present)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    tenant_id,
                    id,
                    person_id,
                    *present as i64
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    })
}
