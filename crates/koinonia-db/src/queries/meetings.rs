//! Cell meeting and attendance queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

/// Meeting row from database.
#[derive(Debug, Clone)]
pub struct MeetingRow {
    pub id: String,
    pub tenant_id: String,
    pub cell_id: String,
    pub meeting_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeetingRow> {
    Ok(MeetingRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        cell_id: row.get(2)?,
        meeting_date: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a meeting with its attendance snapshot in one transaction.
///
/// Attendance is fixed at creation; a failed attendance insert rolls the
/// meeting back too.
pub fn insert_meeting_with_attendance(
    pool: &DbPool,
    id: &str,
    tenant_id: &str,
    cell_id: &str,
    meeting_date: &str,
    notes: Option<&str>,
    attendance: &[(String, bool)],
) -> DbResult<()> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO cell_meetings (id, tenant_id, cell_id, meeting_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, tenant_id, cell_id, meeting_date, notes],
        )?;

        for (person_id, present) in attendance {
            tx.execute(
                "INSERT INTO meeting_attendance (id, tenant_id, meeting_id, person_id, present)
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

/// Get a meeting by ID.
pub fn get_meeting(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<MeetingRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT id, tenant_id, cell_id, meeting_date, notes, created_at
             FROM cell_meetings WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Meeting: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// Most recent meetings of a cell, newest first.
pub fn recent_meetings(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
    limit: i64,
) -> DbResult<Vec<MeetingRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, cell_id, meeting_date, notes, created_at
             FROM cell_meetings WHERE tenant_id = ?1 AND cell_id = ?2
             ORDER BY meeting_date DESC LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![tenant_id, cell_id, limit], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Date of a cell's most recent meeting, if any.
pub fn latest_meeting_date(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
) -> DbResult<Option<String>> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT meeting_date FROM cell_meetings
             WHERE tenant_id = ?1 AND cell_id = ?2
             ORDER BY meeting_date DESC LIMIT 1",
            params![tenant_id, cell_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(DbError::from)
    })
}

/// Present and total attendance rows across a cell's most recent meetings.
pub fn attendance_window(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
    window: i64,
) -> DbResult<(i64, i64)> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COALESCE(SUM(a.present), 0), COUNT(a.id)
             FROM meeting_attendance a
             WHERE a.meeting_id IN (
                 SELECT id FROM cell_meetings
                 WHERE tenant_id = ?1 AND cell_id = ?2
                 ORDER BY meeting_date DESC LIMIT ?3
             )",
            params![tenant_id, cell_id, window],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(DbError::from)
    })
}

/// Present head-count for a single meeting.
pub fn present_count(pool: &DbPool, tenant_id: &str, meeting_id: &str) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COALESCE(SUM(present), 0) FROM meeting_attendance
             WHERE tenant_id = ?1 AND meeting_id = ?2",
            params![tenant_id, meeting_id],
            |row| row.get(0),
        )
        .map_err(DbError::from)
    })
}
