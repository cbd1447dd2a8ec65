//! New-convert database queries.

use crate::pool::{DbError, DbPool, DbResult};
use crate::queries::people;
use rusqlite::params;

/// Convert row from database.
#[derive(Debug, Clone)]
pub struct ConvertRow {
    pub id: String,
    pub tenant_id: String,
    pub person_id: String,
    pub decision_date: String,
    pub decision_context: String,
    pub status: String,
    pub consolidator_id: Option<String>,
    pub evasion_risk_score: f64,
    pub first_contact_at: Option<String>,
    pub last_activity_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

const COLUMNS: &str = "id, tenant_id, person_id, decision_date, decision_context, status,
                       consolidator_id, evasion_risk_score, first_contact_at,
                       last_activity_at, created_at, updated_at";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConvertRow> {
    Ok(ConvertRow {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        person_id: row.get(2)?,
        decision_date: row.get(3)?,
        decision_context: row.get(4)?,
        status: row.get(5)?,
        consolidator_id: row.get(6)?,
        evasion_risk_score: row.get(7)?,
        first_contact_at: row.get(8)?,
        last_activity_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Person fields for a decision registration that creates the person too.
#[derive(Debug, Clone)]
pub struct NewDecisionPerson {
    pub id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
}

/// Register a decision: person (when created here), convert, and the initial
/// decision event are inserted in a single transaction. Either everything
/// lands or nothing does — no orphaned person on a failed convert insert.
#[allow(clippy::too_many_arguments)]
pub fn insert_decision_bundle(
    pool: &DbPool,
    tenant_id: &str,
    convert_id: &str,
    person: Option<&NewDecisionPerson>,
    existing_person_id: Option<&str>,
    decision_date: &str,
    decision_context: &str,
    consolidator_id: Option<&str>,
    event_id: &str,
    event_description: &str,
) -> DbResult<()> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        let person_id = match (person, existing_person_id) {
            (Some(p), _) => {
                people::insert_person_conn(
                    &tx,
                    &p.id,
                    tenant_id,
                    &p.full_name,
                    p.phone.as_deref(),
                    p.neighborhood.as_deref(),
                    p.birth_date.as_deref(),
                    p.gender.as_deref(),
                    "visitor",
                )?;
                p.id.as_str()
            }
            (None, Some(id)) => id,
            (None, None) => {
                return Err(DbError::NotFound(
                    "decision registration needs a person".to_string(),
                ))
            }
        };

        tx.execute(
            "INSERT INTO new_converts (id, tenant_id, person_id, decision_date,
                                       decision_context, status, consolidator_id,
                                       last_activity_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'new', ?6, datetime('now'))",
            params![
                convert_id,
                tenant_id,
                person_id,
                decision_date,
                decision_context,
                consolidator_id
            ],
        )?;

        tx.execute(
            "INSERT INTO consolidation_events (id, tenant_id, convert_id, event_type, description)
             VALUES (?1, ?2, ?3, 'decision', ?4)",
            params![event_id, tenant_id, convert_id, event_description],
        )?;

        tx.commit()?;
        Ok(())
    })
}

/// Get a convert by ID.
pub fn get_convert(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<ConvertRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM new_converts WHERE tenant_id = ?1 AND id = ?2"),
            params![tenant_id, id],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Convert: {}", id)),
            e => DbError::Connection(e),
        })
    })
}

/// List converts for a tenant, most recent decisions first.
pub fn list_converts(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<ConvertRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM new_converts WHERE tenant_id = ?1
             ORDER BY decision_date DESC, created_at DESC"
        ))?;
        let rows = stmt.query_map(params![tenant_id], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Update convert status.
///
/// Entering `contacted` stamps `first_contact_at` exactly once (COALESCE keeps
/// the original timestamp on repeat calls). Every change bumps
/// `last_activity_at` and `updated_at`.
pub fn update_status(pool: &DbPool, tenant_id: &str, id: &str, status: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = if status == "contacted" {
            conn.execute(
                "UPDATE new_converts
                 SET status = ?1,
                     first_contact_at = COALESCE(first_contact_at, datetime('now')),
                     last_activity_at = datetime('now'),
                     updated_at = datetime('now')
                 WHERE tenant_id = ?2 AND id = ?3",
                params![status, tenant_id, id],
            )?
        } else {
            conn.execute(
                "UPDATE new_converts
                 SET status = ?1,
                     last_activity_at = datetime('now'),
                     updated_at = datetime('now')
                 WHERE tenant_id = ?2 AND id = ?3",
                params![status, tenant_id, id],
            )?
        };

        if changed == 0 {
            return Err(DbError::NotFound(format!("Convert: {}", id)));
        }
        Ok(())
    })
}

/// Persist a computed evasion-risk score.
pub fn set_risk_score(pool: &DbPool, tenant_id: &str, id: &str, score: f64) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE new_converts SET evasion_risk_score = ?1, updated_at = datetime('now')
             WHERE tenant_id = ?2 AND id = ?3",
            params![score, tenant_id, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Convert: {}", id)));
        }
        Ok(())
    })
}

/// Count converts per status bucket.
pub fn count_by_status(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<(String, i64)>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM new_converts WHERE tenant_id = ?1 GROUP BY status",
        )?;
        let rows = stmt.query_map(params![tenant_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Aggregate stats: (total, average risk score, count with score >= threshold).
pub fn risk_stats(pool: &DbPool, tenant_id: &str, high_risk_threshold: f64) -> DbResult<(i64, f64, i64)> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(AVG(evasion_risk_score), 0.0),
                    COALESCE(SUM(CASE WHEN evasion_risk_score >= ?2 THEN 1 ELSE 0 END), 0)
             FROM new_converts WHERE tenant_id = ?1",
            params![tenant_id, high_risk_threshold],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .map_err(DbError::from)
    })
}
