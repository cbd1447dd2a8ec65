//! Supervision: cell oversight and health roll-ups.
//!
//! Aggregates per-cell meeting history into supervision-level health figures
//! and raises rule-based alerts. Everything is recomputed per call; nothing
//! is cached or incremental.

pub mod model;

use crate::cell::model::AttendanceMark;
use crate::error::{KoinoniaError, KoinoniaResult};
use crate::time;
use chrono::{Duration, NaiveDate, Utc};
use koinonia_db::queries::{
    alerts as alert_queries, cells as cell_queries, meetings as meeting_queries,
    supervisions as supervision_queries,
};
use koinonia_db::queries::alerts::NewAlert;
use koinonia_db::{DbError, DbPool};
use model::{
    AlertSeverity, AlertType, CellHealth, HealthStatus, Supervision, SupervisionAlert,
    SupervisionDashboard,
};
use tracing::info;
use uuid::Uuid;

/// Meetings considered when averaging a cell's presence.
const PRESENCE_WINDOW: i64 = 4;
/// A cell counts as active when it met within this many days.
const ACTIVE_WITHIN_DAYS: i64 = 15;
/// A cell without a meeting in this many days gets a missing-report alert.
const MISSING_REPORT_DAYS: i64 = 7;
/// Presence-drop fires when the latest head-count falls below this share of
/// the previous one.
const PRESENCE_DROP_RATIO: f64 = 0.7;

/// Create a supervision.
pub fn create_supervision(
    pool: &DbPool,
    tenant_id: &str,
    name: &str,
    parent_id: Option<&str>,
    supervisor_id: Option<&str>,
) -> KoinoniaResult<Supervision> {
    if name.trim().is_empty() {
        return Err(KoinoniaError::validation("supervision name is required"));
    }
    let id = Uuid::new_v4().to_string();
    supervision_queries::create_supervision(pool, &id, tenant_id, name, parent_id, supervisor_id)?;
    get_supervision(pool, tenant_id, &id)
}

/// Get a supervision by ID.
pub fn get_supervision(pool: &DbPool, tenant_id: &str, id: &str) -> KoinoniaResult<Supervision> {
    let row = supervision_queries::get_supervision(pool, tenant_id, id).map_err(|e| match e {
        DbError::NotFound(_) => KoinoniaError::SupervisionNotFound(id.to_string()),
        e => e.into(),
    })?;
    Ok(Supervision::from_row(row))
}

/// List supervisions for a tenant.
pub fn list_supervisions(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<Vec<Supervision>> {
    let rows = supervision_queries::list_supervisions(pool, tenant_id)?;
    Ok(rows.into_iter().map(Supervision::from_row).collect())
}

/// Roll up cell health for a supervision, as of today.
pub fn get_dashboard(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
) -> KoinoniaResult<SupervisionDashboard> {
    get_dashboard_at(pool, tenant_id, supervision_id, Utc::now().date_naive())
}

/// Roll up cell health as of a given date (split out for testability).
pub fn get_dashboard_at(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
    today: NaiveDate,
) -> KoinoniaResult<SupervisionDashboard> {
    get_supervision(pool, tenant_id, supervision_id)?;

    let cells = cell_queries::list_cells_by_supervision(pool, tenant_id, supervision_id)?;
    if cells.is_empty() {
        return Ok(SupervisionDashboard::empty());
    }

    let active_cutoff = today - Duration::days(ACTIVE_WITHIN_DAYS);
    let mut total_members = 0;
    let mut active_cells = 0;
    let mut presence_sum = 0;
    let mut cell_stats = Vec::with_capacity(cells.len());

    for cell in &cells {
        let member_count = cell_queries::count_members(pool, tenant_id, &cell.id)?;
        total_members += member_count;

        let (present, possible) =
            meeting_queries::attendance_window(pool, tenant_id, &cell.id, PRESENCE_WINDOW)?;
        let avg_presence = if possible > 0 {
            (100.0 * present as f64 / possible as f64).round() as i64
        } else {
            // No reporting is itself a health signal: the cell drags the
            // supervision average down.
            0
        };
        presence_sum += avg_presence;

        let last_meeting_date = meeting_queries::latest_meeting_date(pool, tenant_id, &cell.id)?;
        if let Some(date) = last_meeting_date.as_deref().and_then(time::parse_date) {
            if date >= active_cutoff {
                active_cells += 1;
            }
        }

        cell_stats.push(CellHealth {
            cell_id: cell.id.clone(),
            name: cell.name.clone(),
            avg_presence,
            last_meeting_date,
            member_count,
        });
    }

    let total_cells = cells.len() as i64;
    Ok(SupervisionDashboard {
        total_cells,
        total_members,
        active_rate: (100.0 * active_cells as f64 / total_cells as f64).round() as i64,
        avg_presence: (presence_sum as f64 / total_cells as f64).round() as i64,
        cell_stats,
    })
}

/// Sweep every cell of the tenant and raise rule-based alerts, as of today.
pub fn generate_alerts(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<Vec<SupervisionAlert>> {
    generate_alerts_at(pool, tenant_id, Utc::now().date_naive())
}

/// Alert sweep as of a given date (split out for testability).
///
/// Rules per cell:
/// - missing_report/high when no meeting within the report window
/// - presence_drop/medium when at least two meetings exist and the latest
///   head-count fell below 70% of the previous one
///
/// An alert is skipped while an unresolved one of the same type is already
/// open for the cell, so repeated sweeps do not stack duplicates. All raised
/// alerts are batch-inserted at the end, all-or-nothing.
pub fn generate_alerts_at(
    pool: &DbPool,
    tenant_id: &str,
    today: NaiveDate,
) -> KoinoniaResult<Vec<SupervisionAlert>> {
    let cells = cell_queries::list_cells(pool, tenant_id)?;
    let report_cutoff = today - Duration::days(MISSING_REPORT_DAYS);

    let open: Vec<(Option<String>, String)> = alert_queries::list_unresolved(pool, tenant_id)?
        .into_iter()
        .map(|a| (a.cell_id, a.alert_type))
        .collect();
    let is_open = |cell_id: &str, alert_type: AlertType| {
        open.iter()
            .any(|(c, t)| c.as_deref() == Some(cell_id) && t == alert_type.as_str())
    };

    let mut alerts = Vec::new();

    for cell in &cells {
        let latest = meeting_queries::latest_meeting_date(pool, tenant_id, &cell.id)?;
        let reported = latest
            .as_deref()
            .and_then(time::parse_date)
            .map(|d| d >= report_cutoff)
            .unwrap_or(false);

        if !reported && !is_open(&cell.id, AlertType::MissingReport) {
            alerts.push(NewAlert {
                id: Uuid::new_v4().to_string(),
                supervision_id: cell.supervision_id.clone(),
                cell_id: Some(cell.id.clone()),
                alert_type: AlertType::MissingReport.as_str().to_string(),
                severity: AlertSeverity::High.as_str().to_string(),
                message: format!("Cell '{}' has no meeting report in the last {} days", cell.name, MISSING_REPORT_DAYS),
            });
        }

        let recent = meeting_queries::recent_meetings(pool, tenant_id, &cell.id, 2)?;
        if recent.len() == 2 && !is_open(&cell.id, AlertType::PresenceDrop) {
            let current = meeting_queries::present_count(pool, tenant_id, &recent[0].id)?;
            let previous = meeting_queries::present_count(pool, tenant_id, &recent[1].id)?;
            if (current as f64) < (previous as f64) * PRESENCE_DROP_RATIO {
                alerts.push(NewAlert {
                    id: Uuid::new_v4().to_string(),
                    supervision_id: cell.supervision_id.clone(),
                    cell_id: Some(cell.id.clone()),
                    alert_type: AlertType::PresenceDrop.as_str().to_string(),
                    severity: AlertSeverity::Medium.as_str().to_string(),
                    message: format!(
                        "Cell '{}' presence dropped from {} to {}",
                        cell.name, previous, current
                    ),
                });
            }
        }
    }

    alert_queries::insert_alerts(pool, tenant_id, &alerts)?;
    info!(tenant_id, raised = alerts.len(), "alert sweep finished");

    let raised: Vec<String> = alerts.iter().map(|a| a.id.clone()).collect();
    let rows = alert_queries::list_unresolved(pool, tenant_id)?;
    Ok(rows
        .into_iter()
        .filter(|r| raised.contains(&r.id))
        .map(SupervisionAlert::from_row)
        .collect())
}

/// List unresolved alerts for a tenant.
pub fn list_unresolved_alerts(
    pool: &DbPool,
    tenant_id: &str,
) -> KoinoniaResult<Vec<SupervisionAlert>> {
    let rows = alert_queries::list_unresolved(pool, tenant_id)?;
    Ok(rows.into_iter().map(SupervisionAlert::from_row).collect())
}

/// Mark an alert resolved.
pub fn resolve_alert(pool: &DbPool, tenant_id: &str, alert_id: &str) -> KoinoniaResult<()> {
    alert_queries::resolve_alert(pool, tenant_id, alert_id).map_err(|e| match e {
        DbError::NotFound(_) => KoinoniaError::AlertNotFound(alert_id.to_string()),
        e => e.into(),
    })
}

/// Traffic-light status from the supervision's unresolved alerts.
pub fn get_status(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
) -> KoinoniaResult<HealthStatus> {
    get_supervision(pool, tenant_id, supervision_id)?;
    let severities: Vec<AlertSeverity> =
        alert_queries::unresolved_severities(pool, tenant_id, supervision_id)?
            .iter()
            .map(|s| AlertSeverity::from_str(s))
            .collect();
    Ok(HealthStatus::from_severities(&severities))
}

/// Record a supervisor's visit to a cell.
pub fn record_visit(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
    cell_id: &str,
    visitor_id: Option<&str>,
    visit_date: &str,
    notes: Option<&str>,
) -> KoinoniaResult<()> {
    get_supervision(pool, tenant_id, supervision_id)?;
    crate::cell::get_cell(pool, tenant_id, cell_id)?;
    if time::parse_date(visit_date).is_none() {
        return Err(KoinoniaError::validation(format!(
            "invalid visit date '{}' (expected YYYY-MM-DD)",
            visit_date
        )));
    }
    let id = Uuid::new_v4().to_string();
    supervision_queries::insert_visit(
        pool, &id, tenant_id, supervision_id, cell_id, visitor_id, visit_date, notes,
    )?;
    Ok(())
}

/// Record a supervision-level meeting with attendance, in one transaction.
pub fn record_supervision_meeting(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
    meeting_date: &str,
    agenda: Option<&str>,
    attendance: &[AttendanceMark],
) -> KoinoniaResult<String> {
    get_supervision(pool, tenant_id, supervision_id)?;
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
    supervision_queries::insert_supervision_meeting(
        pool, &id, tenant_id, supervision_id, meeting_date, agenda, &marks,
    )?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell;
    use crate::person;

    const TENANT: &str = "t1";

    fn test_pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        koinonia_db::migrations::run_migrations(&pool).unwrap();
        pool
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
    }

    /// Record a meeting with `present` attendees and `absent` absentees.
    fn meeting(pool: &DbPool, cell_id: &str, on: &str, present: usize, absent: usize) {
        let mut marks = Vec::new();
        for i in 0..(present + absent) {
            let p = person::create_person(
                pool,
                TENANT,
                &format!("Person {}", i),
                None,
                None,
                None,
                None,
            )
            .unwrap();
            marks.push(AttendanceMark {
                person_id: p.id,
                present: i < present,
            });
        }
        cell::record_meeting(pool, TENANT, cell_id, on, None, &marks).unwrap();
    }

    #[test]
    fn test_dashboard_zero_cells() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let dash = get_dashboard_at(&pool, TENANT, &sup.id, today()).unwrap();
        assert_eq!(dash.total_cells, 0);
        assert_eq!(dash.total_members, 0);
        assert_eq!(dash.active_rate, 0);
        assert_eq!(dash.avg_presence, 0);
        assert!(dash.cell_stats.is_empty());
    }

    #[test]
    fn test_dashboard_presence_and_active_rate() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let active = cell::create_cell(&pool, TENANT, "Active", Some(&sup.id), None).unwrap();
        let silent = cell::create_cell(&pool, TENANT, "Silent", Some(&sup.id), None).unwrap();

        // 3 of 4 present on a recent meeting
        meeting(&pool, &active.id, "2026-08-20", 3, 1);
        // Silent cell met long ago, outside the active window
        meeting(&pool, &silent.id, "2026-07-01", 2, 0);

        let dash = get_dashboard_at(&pool, TENANT, &sup.id, today()).unwrap();
        assert_eq!(dash.total_cells, 2);
        // one of two cells met within 15 days
        assert_eq!(dash.active_rate, 50);

        let active_stats = dash
            .cell_stats
            .iter()
            .find(|c| c.cell_id == active.id)
            .unwrap();
        assert_eq!(active_stats.avg_presence, 75);
        // (75 + 100) / 2, the old meeting still counts toward presence
        assert_eq!(dash.avg_presence, 88);
    }

    #[test]
    fn test_dashboard_presence_window_is_four_meetings() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Window", Some(&sup.id), None).unwrap();

        // Oldest meeting has 0% presence and must fall out of the window
        meeting(&pool, &c.id, "2026-08-01", 0, 2);
        for day in ["2026-08-05", "2026-08-10", "2026-08-15", "2026-08-20"] {
            meeting(&pool, &c.id, day, 2, 0);
        }

        let dash = get_dashboard_at(&pool, TENANT, &sup.id, today()).unwrap();
        assert_eq!(dash.cell_stats[0].avg_presence, 100);
    }

    #[test]
    fn test_cell_without_meetings_drags_average_down() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let reporting = cell::create_cell(&pool, TENANT, "Reporting", Some(&sup.id), None).unwrap();
        cell::create_cell(&pool, TENANT, "Empty", Some(&sup.id), None).unwrap();

        meeting(&pool, &reporting.id, "2026-08-20", 2, 0);

        let dash = get_dashboard_at(&pool, TENANT, &sup.id, today()).unwrap();
        assert_eq!(dash.avg_presence, 50);
    }

    #[test]
    fn test_missing_report_alert() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let stale = cell::create_cell(&pool, TENANT, "Stale", Some(&sup.id), None).unwrap();
        let fresh = cell::create_cell(&pool, TENANT, "Fresh", Some(&sup.id), None).unwrap();

        meeting(&pool, &stale.id, "2026-08-10", 2, 0);
        meeting(&pool, &fresh.id, "2026-08-22", 2, 0);

        let alerts = generate_alerts_at(&pool, TENANT, today()).unwrap();
        let missing: Vec<_> = alerts
            .iter()
            .filter(|a| a.alert_type == AlertType::MissingReport)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].cell_id.as_deref(), Some(stale.id.as_str()));
        assert_eq!(missing[0].severity, AlertSeverity::High);
    }

    #[test]
    fn test_presence_drop_alert() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Dropping", Some(&sup.id), None).unwrap();

        meeting(&pool, &c.id, "2026-08-18", 10, 0);
        meeting(&pool, &c.id, "2026-08-24", 6, 4); // 6 < 10 * 0.7

        let alerts = generate_alerts_at(&pool, TENANT, today()).unwrap();
        let drops: Vec<_> = alerts
            .iter()
            .filter(|a| a.alert_type == AlertType::PresenceDrop)
            .collect();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].severity, AlertSeverity::Medium);
        assert_eq!(drops[0].cell_id.as_deref(), Some(c.id.as_str()));
    }

    #[test]
    fn test_presence_drop_needs_two_meetings() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Single", Some(&sup.id), None).unwrap();
        meeting(&pool, &c.id, "2026-08-24", 1, 9);

        let alerts = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert!(alerts.iter().all(|a| a.alert_type != AlertType::PresenceDrop));
    }

    #[test]
    fn test_presence_drop_not_fired_at_exactly_seventy_percent() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Borderline", Some(&sup.id), None).unwrap();

        meeting(&pool, &c.id, "2026-08-18", 10, 0);
        meeting(&pool, &c.id, "2026-08-24", 7, 3); // exactly 70%

        let alerts = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert!(alerts.iter().all(|a| a.alert_type != AlertType::PresenceDrop));
    }

    #[test]
    fn test_sweep_does_not_duplicate_open_alerts() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Stale", Some(&sup.id), None).unwrap();
        meeting(&pool, &c.id, "2026-08-01", 2, 0);

        let first = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert_eq!(first.len(), 1);
        let second = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert!(second.is_empty());
        assert_eq!(list_unresolved_alerts(&pool, TENANT).unwrap().len(), 1);

        // Once resolved, the next sweep may raise it again
        resolve_alert(&pool, TENANT, &first[0].id).unwrap();
        let third = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_traffic_light_status() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Quiet", Some(&sup.id), None).unwrap();

        assert_eq!(get_status(&pool, TENANT, &sup.id).unwrap(), HealthStatus::Green);

        // Stale cell raises a high-severity missing report: red
        meeting(&pool, &c.id, "2026-08-01", 2, 0);
        let alerts = generate_alerts_at(&pool, TENANT, today()).unwrap();
        assert_eq!(get_status(&pool, TENANT, &sup.id).unwrap(), HealthStatus::Red);

        // Resolving every high alert leaves green again
        for alert in &alerts {
            resolve_alert(&pool, TENANT, &alert.id).unwrap();
        }
        assert_eq!(get_status(&pool, TENANT, &sup.id).unwrap(), HealthStatus::Green);
    }

    #[test]
    fn test_status_yellow_with_only_medium_alerts() {
        let pool = test_pool();
        let sup = create_supervision(&pool, TENANT, "North", None, None).unwrap();
        let c = cell::create_cell(&pool, TENANT, "Dropping", Some(&sup.id), None).unwrap();

        // Two recent meetings with a big drop: presence_drop (medium) only,
        // the latest meeting is recent enough to avoid missing_report.
        meeting(&pool, &c.id, "2026-08-20", 10, 0);
        meeting(&pool, &c.id, "2026-08-24", 2, 8);
        generate_alerts_at(&pool, TENANT, today()).unwrap();

        assert_eq!(get_status(&pool, TENANT, &sup.id).unwrap(), HealthStatus::Yellow);
    }
}
