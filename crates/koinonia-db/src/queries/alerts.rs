//! Supervision alert queries.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::params;

/// Alert row from database.
#[derive(Debug, Clone)]
pub struct AlertRow {
    pub id: String,
    pub tenant_id: String,
    pub supervision_id: Option<String>,
    pub cell_id: Option<String>,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub is_resolved: bool,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

const COLUMNS: &str = "id, tenant_id, supervision_id, cell_id, alert_type, severity,
                       message, is_resolved, created_at, resolved_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AlertRow> {
    Ok(AlertRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        supervision_id: row.get(2)?,
        cell_id: row.get(3)?,
        alert_type: row.get(4)?,
        severity: row.get(5)?,
        message: row.get(6)?,
        is_resolved: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
        resolved_at: row.get(9)?,
    })
}

/// Fields for a new alert (batch insert input).
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub id: String,
    pub supervision_id: Option<String>,
    pub cell_id: Option<String>,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
}

/// Insert a batch of alerts in a single transaction (all-or-nothing).
pub fn insert_alerts(pool: &DbPool, tenant_id: &str, alerts: &[NewAlert]) -> DbResult<()> {
    if alerts.is_empty() {
        return Ok(());
    }
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for alert in alerts {
            tx.execute(
                "INSERT INTO supervision_alerts (id, tenant_id, supervision_id, cell_id,
                                                 alert_type, severity, message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    alert.id,
                    tenant_id,
                    alert.supervision_id,
                    alert.cell_id,
                    alert.alert_type,
                    alert.severity,
                    alert.message
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    })
}

/// List unresolved alerts for a tenant, newest first.
pub fn list_unresolved(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<AlertRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM supervision_alerts
             WHERE tenant_id = ?1 AND is_resolved = 0
             ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map(params![tenant_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Severities of unresolved alerts attached to a supervision, either directly
/// or through one of its cells.
pub fn unresolved_severities(
    pool: &DbPool,
    tenant_id: &str,
    supervision_id: &str,
) -> DbResult<Vec<String>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT a.severity FROM supervision_alerts a
             LEFT JOIN cells c ON a.cell_id = c.id
             WHERE a.tenant_id = ?1 AND a.is_resolved = 0
               AND (a.supervision_id = ?2 OR c.supervision_id = ?2)",
        )?;
        let rows = stmt.query_map(params![tenant_id, supervision_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Mark an alert resolved.
pub fn resolve_alert(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE supervision_alerts
             SET is_resolved = 1, resolved_at = datetime('now')
             WHERE tenant_id = ?1 AND id = ?2",
            params![tenant_id, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Alert: {}", id)));
        }
        Ok(())
    })
}
