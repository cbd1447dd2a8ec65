//! Cells and their meetings.

pub mod model;

use crate::error::{KoinoniaError, KoinoniaResult};
use crate::time;
use koinonia_db::queries::{cells as cell_queries, meetings as meeting_queries};
use koinonia_db::{DbError, DbPool};
use model::{AttendanceMark, Cell, CellMeeting};
use tracing::info;
use uuid::Uuid;

/// Create a new cell.
pub fn create_cell(
    pool: &DbPool,
    tenant_id: &str,
    name: &str,
    supervision_id: Option<&str>,
    leader_id: Option<&str>,
) -> KoinoniaResult<Cell> {
    if name.trim().is_empty() {
        return Err(KoinoniaError::validation("cell name is required"));
    }

    let id = Uuid::new_v4().to_string();
    cell_queries::create_cell(pool, &id, tenant_id, name, supervision_id, leader_id)?;
    get_cell(pool, tenant_id, &id)
}

/// Get a cell by ID.
pub fn get_cell(pool: &DbPool, tenant_id: &str, id: &str) -> KoinoniaResult<Cell> {
    let row = cell_queries::get_cell(pool, tenant_id, id).map_err(|e| match e {
        DbError::NotFound(_) => KoinoniaError::CellNotFound(id.to_string()),
        e => e.into(),
    })?;
    Ok(Cell::from_row(row))
}

/// List all cells for a tenant.
pub fn list_cells(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<Vec<Cell>> {
    let rows = cell_queries::list_cells(pool, tenant_id)?;
    Ok(rows.into_iter().map(Cell::from_row).collect())
}

/// Add a person to a cell.
pub fn add_member(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
    person_id: &str,
    role: &str,
) -> KoinoniaResult<()> {
    get_cell(pool, tenant_id, cell_id)?;
    let id = Uuid::new_v4().to_string();
    cell_queries::add_member(pool, &id, tenant_id, cell_id, person_id, role)?;
    Ok(())
}

/// Record a held meeting with its attendance snapshot.
///
/// Meeting and attendance rows land in one transaction; the snapshot is fixed
/// at creation.
pub fn record_meeting(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
    meeting_date: &str,
    notes: Option<&str>,
    attendance: &[AttendanceMark],
) -> KoinoniaResult<CellMeeting> {
    get_cell(pool, tenant_id, cell_id)?;

    if time::parse_date(meeting_date).is_none() {
        return Err(KoinoniaError::validation(format!(
            "invalid meeting date '{}' (expected YYYY-MM-DD)",
            meeting_date
        )));
    }

    let id = Uuid::new_v4().to_string();
    let marks: Vec<(String, bool)> = attendance
        .iter()
        .map(|m| (m.person_id.clone(), m.present))
        .collect();

    meeting_queries::insert_meeting_with_attendance(
        pool,
        &id,
        tenant_id,
        cell_id,
        meeting_date,
        notes,
        &marks,
    )?;

    info!(tenant_id, cell_id, meeting_date, attendees = marks.len(), "meeting recorded");

    let row = meeting_queries::get_meeting(pool, tenant_id, &id)?;
    Ok(CellMeeting::from_row(row))
}

/// Most recent meetings of a cell, newest first.
pub fn list_recent_meetings(
    pool: &DbPool,
    tenant_id: &str,
    cell_id: &str,
    limit: i64,
) -> KoinoniaResult<Vec<CellMeeting>> {
    get_cell(pool, tenant_id, cell_id)?;
    let rows = meeting_queries::recent_meetings(pool, tenant_id, cell_id, limit)?;
    Ok(rows.into_iter().map(CellMeeting::from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person;

    const TENANT: &str = "t1";

    fn test_pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        koinonia_db::migrations::run_migrations(&pool).unwrap();
        pool
    }

    #[test]
    fn test_record_meeting_snapshot() {
        let pool = test_pool();
        let cell = create_cell(&pool, TENANT, "Cell Alpha", None, None).unwrap();
        let p1 = person::create_person(&pool, TENANT, "Ana", None, None, None, None).unwrap();
        let p2 = person::create_person(&pool, TENANT, "Rui", None, None, None, None).unwrap();

        let meeting = record_meeting(
            &pool,
            TENANT,
            &cell.id,
            "2026-08-20",
            Some("first meeting"),
            &[
                AttendanceMark { person_id: p1.id.clone(), present: true },
                AttendanceMark { person_id: p2.id.clone(), present: false },
            ],
        )
        .unwrap();
        assert_eq!(meeting.meeting_date, "2026-08-20");

        let present =
            koinonia_db::queries::meetings::present_count(&pool, TENANT, &meeting.id).unwrap();
        assert_eq!(present, 1);
    }

    #[test]
    fn test_record_meeting_atomic() {
        let pool = test_pool();
        let cell = create_cell(&pool, TENANT, "Cell Beta", None, None).unwrap();

        // Unknown person violates the attendance foreign key; the meeting
        // row must roll back with it.
        let result = record_meeting(
            &pool,
            TENANT,
            &cell.id,
            "2026-08-20",
            None,
            &[AttendanceMark { person_id: "nobody".to_string(), present: true }],
        );
        assert!(result.is_err());

        let meetings = list_recent_meetings(&pool, TENANT, &cell.id, 10).unwrap();
        assert!(meetings.is_empty());
    }

    #[test]
    fn test_record_meeting_rejects_bad_date() {
        let pool = test_pool();
        let cell = create_cell(&pool, TENANT, "Cell Gamma", None, None).unwrap();
        assert!(matches!(
            record_meeting(&pool, TENANT, &cell.id, "20/08/2026", None, &[]),
            Err(KoinoniaError::ValidationError(_))
        ));
    }
}
