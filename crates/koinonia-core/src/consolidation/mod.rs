//! Consolidation: new-convert follow-up.
//!
//! Tracks converts through the funnel (new → contacted → connected →
//! integrated, with lost as terminal), keeps the append-only event log, and
//! scores evasion risk.

pub mod model;
pub mod risk;

use crate::error::{KoinoniaError, KoinoniaResult};
use crate::time;
use chrono::Utc;
use koinonia_db::queries::{converts as convert_queries, events as event_queries};
use koinonia_db::queries::converts::NewDecisionPerson;
use koinonia_db::{DbError, DbPool};
use model::{
    ConsolidationEvent, ConsolidationStats, Convert, ConvertStatus, DecisionContext, EventType,
    FunnelData,
};
use tracing::info;
use uuid::Uuid;

/// Score at or above which a convert counts as high-risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Input for a decision registration.
#[derive(Debug, Clone, Default)]
pub struct DecisionInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub decision_date: String,
    pub decision_context: String,
    pub neighborhood: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub consolidator_id: Option<String>,
    /// Link to an existing person instead of creating one.
    pub person_id: Option<String>,
}

/// Register a decision: person (created as `visitor` when none is supplied),
/// convert with status `new`, and the initial `decision` event — all in one
/// transaction.
pub fn register_decision(
    pool: &DbPool,
    tenant_id: &str,
    input: &DecisionInput,
) -> KoinoniaResult<Convert> {
    let context = DecisionContext::try_from_str(&input.decision_context).ok_or_else(|| {
        KoinoniaError::validation(format!(
            "invalid decision context '{}' (expected accept, reconcile, visitor or transfer)",
            input.decision_context
        ))
    })?;

    if time::parse_date(&input.decision_date).is_none() {
        return Err(KoinoniaError::validation(format!(
            "invalid decision date '{}' (expected YYYY-MM-DD)",
            input.decision_date
        )));
    }

    let new_person = if input.person_id.is_none() {
        if input.full_name.trim().is_empty() {
            return Err(KoinoniaError::validation("full_name is required"));
        }
        Some(NewDecisionPerson {
            id: Uuid::new_v4().to_string(),
            full_name: input.full_name.clone(),
            phone: input.phone.clone(),
            neighborhood: input.neighborhood.clone(),
            birth_date: input.birth_date.clone(),
            gender: input.gender.clone(),
        })
    } else {
        None
    };

    let convert_id = Uuid::new_v4().to_string();
    let event_id = Uuid::new_v4().to_string();

    convert_queries::insert_decision_bundle(
        pool,
        tenant_id,
        &convert_id,
        new_person.as_ref(),
        input.person_id.as_deref(),
        &input.decision_date,
        context.as_str(),
        input.consolidator_id.as_deref(),
        &event_id,
        &format!("Decision registered ({})", context.as_str()),
    )?;

    info!(tenant_id, convert_id = %convert_id, context = context.as_str(), "decision registered");

    get_convert(pool, tenant_id, &convert_id)
}

/// Get a convert by ID.
pub fn get_convert(pool: &DbPool, tenant_id: &str, id: &str) -> KoinoniaResult<Convert> {
    let row = convert_queries::get_convert(pool, tenant_id, id).map_err(|e| match e {
        DbError::NotFound(_) => KoinoniaError::ConvertNotFound(id.to_string()),
        e => e.into(),
    })?;
    Ok(Convert::from_row(row))
}

/// List converts, most recent decisions first.
pub fn list_converts(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<Vec<Convert>> {
    let rows = convert_queries::list_converts(pool, tenant_id)?;
    Ok(rows.into_iter().map(Convert::from_row).collect())
}

/// Move a convert to a new funnel status.
///
/// The transition is checked against the status table; entering `contacted`
/// stamps `first_contact_at` once.
pub fn update_convert_status(
    pool: &DbPool,
    tenant_id: &str,
    convert_id: &str,
    new_status: &str,
) -> KoinoniaResult<Convert> {
    let target = ConvertStatus::try_from_str(new_status).ok_or_else(|| {
        KoinoniaError::validation(format!("invalid status '{}'", new_status))
    })?;

    let current = get_convert(pool, tenant_id, convert_id)?.status;
    if !current.can_transition_to(&target) {
        return Err(KoinoniaError::InvalidStatusTransition {
            from: current.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }

    convert_queries::update_status(pool, tenant_id, convert_id, target.as_str())?;
    info!(tenant_id, convert_id, status = target.as_str(), "convert status updated");

    get_convert(pool, tenant_id, convert_id)
}

/// Append an event to a convert's log.
///
/// A `contact_success` event also drives the convert to `contacted` when it
/// has not reached that point yet (the log can move the funnel).
pub fn log_event(
    pool: &DbPool,
    tenant_id: &str,
    convert_id: &str,
    event_type: &str,
    description: Option<&str>,
    metadata: Option<&serde_json::Value>,
) -> KoinoniaResult<ConsolidationEvent> {
    let kind = EventType::try_from_str(event_type).ok_or_else(|| {
        KoinoniaError::validation(format!("invalid event type '{}'", event_type))
    })?;

    // Confirms the convert exists before touching the log.
    let convert = get_convert(pool, tenant_id, convert_id)?;

    let metadata_json = metadata.map(serde_json::to_string).transpose()?;
    let id = Uuid::new_v4().to_string();
    event_queries::insert_event(
        pool,
        &id,
        tenant_id,
        convert_id,
        kind.as_str(),
        description,
        metadata_json.as_deref(),
    )?;

    if kind == EventType::ContactSuccess
        && convert.status != ConvertStatus::Contacted
        && convert.status != ConvertStatus::Lost
    {
        update_convert_status(pool, tenant_id, convert_id, ConvertStatus::Contacted.as_str())?;
    }

    let row = event_queries::get_event(pool, tenant_id, &id)?;
    Ok(ConsolidationEvent::from_row(row))
}

/// List a convert's events, newest first.
pub fn list_events(
    pool: &DbPool,
    tenant_id: &str,
    convert_id: &str,
) -> KoinoniaResult<Vec<ConsolidationEvent>> {
    get_convert(pool, tenant_id, convert_id)?;
    let rows = event_queries::list_events(pool, tenant_id, convert_id)?;
    Ok(rows.into_iter().map(ConsolidationEvent::from_row).collect())
}

/// Compute, persist and return a convert's evasion-risk score.
pub fn compute_evasion_risk(pool: &DbPool, tenant_id: &str, convert_id: &str) -> KoinoniaResult<f64> {
    let convert = get_convert(pool, tenant_id, convert_id)?;

    let created_at = time::parse_timestamp(&convert.created_at).ok_or_else(|| {
        KoinoniaError::validation(format!("unreadable created_at '{}'", convert.created_at))
    })?;
    let last_activity_at = convert
        .last_activity_at
        .as_deref()
        .and_then(time::parse_timestamp);

    let attempts = event_queries::count_events_by_type(
        pool,
        tenant_id,
        convert_id,
        EventType::ContactAttempt.as_str(),
    )?;
    let successes = event_queries::count_events_by_type(
        pool,
        tenant_id,
        convert_id,
        EventType::ContactSuccess.as_str(),
    )?;

    let score = risk::evasion_risk(&risk::RiskInputs {
        now: Utc::now(),
        created_at,
        last_activity_at,
        status: convert.status,
        contact_attempts: attempts,
        contact_successes: successes,
    });

    convert_queries::set_risk_score(pool, tenant_id, convert_id, score)?;
    Ok(score)
}

/// Count converts per funnel bucket.
pub fn get_funnel_data(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<FunnelData> {
    let counts = convert_queries::count_by_status(pool, tenant_id)?;
    let mut funnel = FunnelData {
        new: 0,
        contacted: 0,
        connected: 0,
        integrated: 0,
        lost: 0,
    };
    for (status, count) in counts {
        match ConvertStatus::from_str(&status) {
            ConvertStatus::New => funnel.new = count,
            ConvertStatus::Contacted => funnel.contacted = count,
            ConvertStatus::Connected => funnel.connected = count,
            ConvertStatus::Integrated => funnel.integrated = count,
            ConvertStatus::Lost => funnel.lost = count,
        }
    }
    Ok(funnel)
}

/// Funnel buckets plus risk aggregates.
pub fn get_consolidation_stats(pool: &DbPool, tenant_id: &str) -> KoinoniaResult<ConsolidationStats> {
    let funnel = get_funnel_data(pool, tenant_id)?;
    let (total, avg_risk_score, high_risk_count) =
        convert_queries::risk_stats(pool, tenant_id, HIGH_RISK_THRESHOLD)?;
    Ok(ConsolidationStats {
        funnel,
        total,
        avg_risk_score,
        high_risk_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    const TENANT: &str = "t1";

    fn test_pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        koinonia_db::migrations::run_migrations(&pool).unwrap();
        pool
    }

    fn decision(name: &str) -> DecisionInput {
        DecisionInput {
            full_name: name.to_string(),
            decision_date: "2026-08-20".to_string(),
            decision_context: "accept".to_string(),
            ..Default::default()
        }
    }

    fn backdate(pool: &DbPool, convert_id: &str, days: i64) {
        pool.with_conn(|conn| {
            conn.execute(
                "UPDATE new_converts
                 SET created_at = datetime('now', ?1), last_activity_at = datetime('now', ?1)
                 WHERE id = ?2",
                params![format!("-{} days", days), convert_id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_register_decision_creates_exactly_one_of_each() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Maria Silva")).unwrap();

        assert_eq!(convert.status, ConvertStatus::New);
        assert_eq!(convert.decision_context, DecisionContext::Accept);

        let (people, converts, events): (i64, i64, i64) = pool
            .with_conn(|conn| {
                Ok((
                    conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?,
                    conn.query_row("SELECT COUNT(*) FROM new_converts", [], |r| r.get(0))?,
                    conn.query_row(
                        "SELECT COUNT(*) FROM consolidation_events WHERE event_type = 'decision'",
                        [],
                        |r| r.get(0),
                    )?,
                ))
            })
            .unwrap();
        assert_eq!((people, converts, events), (1, 1, 1));

        // The person was created as a visitor
        let person = crate::person::get_person(&pool, TENANT, &convert.person_id).unwrap();
        assert_eq!(
            person.membership_status,
            crate::person::model::MembershipStatus::Visitor
        );
    }

    #[test]
    fn test_register_decision_rejects_bad_context() {
        let pool = test_pool();
        let mut input = decision("Maria Silva");
        input.decision_context = "baptism".to_string();
        assert!(matches!(
            register_decision(&pool, TENANT, &input),
            Err(KoinoniaError::ValidationError(_))
        ));
        // Nothing was written
        let people: i64 = pool
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))
                    .map_err(Into::into)
            })
            .unwrap();
        assert_eq!(people, 0);
    }

    #[test]
    fn test_register_decision_atomic_on_bad_person_link() {
        let pool = test_pool();
        let mut input = decision("");
        input.person_id = Some("missing-person".to_string());
        // Foreign key on new_converts.person_id fails; no event row may survive
        assert!(register_decision(&pool, TENANT, &input).is_err());
        let events: i64 = pool
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM consolidation_events", [], |r| r.get(0))
                    .map_err(Into::into)
            })
            .unwrap();
        assert_eq!(events, 0);
    }

    #[test]
    fn test_status_update_stamps_first_contact_once() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Ana")).unwrap();

        let updated = update_convert_status(&pool, TENANT, &convert.id, "contacted").unwrap();
        let first = updated.first_contact_at.clone().unwrap();

        // Moving away and back must not re-stamp
        update_convert_status(&pool, TENANT, &convert.id, "connected").unwrap();
        let again = update_convert_status(&pool, TENANT, &convert.id, "contacted").unwrap();
        assert_eq!(again.first_contact_at.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_lost_is_terminal() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("João")).unwrap();
        update_convert_status(&pool, TENANT, &convert.id, "lost").unwrap();

        let err = update_convert_status(&pool, TENANT, &convert.id, "contacted").unwrap_err();
        assert!(matches!(err, KoinoniaError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_contact_success_drives_status() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Pedro")).unwrap();

        log_event(&pool, TENANT, &convert.id, "contact_success", Some("answered"), None).unwrap();
        let convert = get_convert(&pool, TENANT, &convert.id).unwrap();
        assert_eq!(convert.status, ConvertStatus::Contacted);
        assert!(convert.first_contact_at.is_some());

        // Idempotent when already contacted
        log_event(&pool, TENANT, &convert.id, "contact_success", None, None).unwrap();
        let convert = get_convert(&pool, TENANT, &convert.id).unwrap();
        assert_eq!(convert.status, ConvertStatus::Contacted);

        // Also fires from states past contacted (correction path)
        update_convert_status(&pool, TENANT, &convert.id, "connected").unwrap();
        log_event(&pool, TENANT, &convert.id, "contact_success", None, None).unwrap();
        let convert = get_convert(&pool, TENANT, &convert.id).unwrap();
        assert_eq!(convert.status, ConvertStatus::Contacted);
    }

    #[test]
    fn test_log_event_rejects_unknown_type() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Rui")).unwrap();
        assert!(matches!(
            log_event(&pool, TENANT, &convert.id, "phone_call", None, None),
            Err(KoinoniaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_compute_risk_fresh_convert() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Clara")).unwrap();
        let score = compute_evasion_risk(&pool, TENANT, &convert.id).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_compute_risk_persists_score() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Clara")).unwrap();
        backdate(&pool, &convert.id, 10);

        let score = compute_evasion_risk(&pool, TENANT, &convert.id).unwrap();
        // 10 idle days, still new: 0.3 + 0.2
        assert!((score - 0.5).abs() < 1e-9);

        let stored = get_convert(&pool, TENANT, &convert.id).unwrap().evasion_risk_score;
        assert!((stored - score).abs() < 1e-9);
    }

    #[test]
    fn test_compute_risk_counts_failed_attempts() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Bruno")).unwrap();
        for _ in 0..4 {
            log_event(&pool, TENANT, &convert.id, "contact_attempt", None, None).unwrap();
        }
        backdate(&pool, &convert.id, 20);

        let score = compute_evasion_risk(&pool, TENANT, &convert.id).unwrap();
        // 0.3 + 0.5 + 0.2 (still new) + 0.4, clamped
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_funnel_and_stats() {
        let pool = test_pool();
        let a = register_decision(&pool, TENANT, &decision("A")).unwrap();
        let b = register_decision(&pool, TENANT, &decision("B")).unwrap();
        register_decision(&pool, TENANT, &decision("C")).unwrap();
        update_convert_status(&pool, TENANT, &a.id, "contacted").unwrap();
        update_convert_status(&pool, TENANT, &b.id, "lost").unwrap();

        let funnel = get_funnel_data(&pool, TENANT).unwrap();
        assert_eq!(funnel.new, 1);
        assert_eq!(funnel.contacted, 1);
        assert_eq!(funnel.lost, 1);
        assert_eq!(funnel.total(), 3);

        let stats = get_consolidation_stats(&pool, TENANT).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.high_risk_count, 0);
    }

    #[test]
    fn test_tenant_isolation() {
        let pool = test_pool();
        let convert = register_decision(&pool, TENANT, &decision("Maria")).unwrap();
        assert!(matches!(
            get_convert(&pool, "other-tenant", &convert.id),
            Err(KoinoniaError::ConvertNotFound(_))
        ));
        assert_eq!(list_converts(&pool, "other-tenant").unwrap().len(), 0);
    }
}
