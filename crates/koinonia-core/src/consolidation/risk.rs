//! Evasion-risk scoring.
//!
//! A pure function of the clock, the convert's activity anchor, its status,
//! and its contact-attempt history. Persisting the score is the caller's
//! separate step, so this stays trivially unit-testable.

use crate::consolidation::model::ConvertStatus;
use chrono::{DateTime, Utc};

/// Inputs to the risk heuristic.
#[derive(Debug, Clone)]
pub struct RiskInputs {
    pub now: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub status: ConvertStatus,
    pub contact_attempts: i64,
    pub contact_successes: i64,
}

/// Compute the evasion-risk score in [0, 1].
///
/// Additive rules, clamped:
/// - +0.3 when more than 7 days since last activity
/// - +0.5 when more than 14 days (stacks with the rule above)
/// - +0.2 when status is still `new` after more than 2 days
/// - +0.4 when more than 3 contact attempts and zero successes
pub fn evasion_risk(inputs: &RiskInputs) -> f64 {
    let anchor = inputs.last_activity_at.unwrap_or(inputs.created_at);
    let days_inactive = (inputs.now - anchor).num_days();

    let mut score: f64 = 0.0;

    if days_inactive > 7 {
        score += 0.3;
    }
    if days_inactive > 14 {
        score += 0.5;
    }
    if inputs.status == ConvertStatus::New && days_inactive > 2 {
        score += 0.2;
    }
    if inputs.contact_attempts > 3 && inputs.contact_successes == 0 {
        score += 0.4;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap()
    }

    fn inputs(days_ago: i64, status: ConvertStatus, attempts: i64, successes: i64) -> RiskInputs {
        RiskInputs {
            now: now(),
            created_at: now() - Duration::days(days_ago),
            last_activity_at: None,
            status,
            contact_attempts: attempts,
            contact_successes: successes,
        }
    }

    #[test]
    fn test_fresh_convert_scores_zero() {
        assert_eq!(evasion_risk(&inputs(0, ConvertStatus::New, 0, 0)), 0.0);
        assert_eq!(evasion_risk(&inputs(2, ConvertStatus::New, 0, 0)), 0.0);
    }

    #[test]
    fn test_stale_new_convert() {
        // 3 days, still new: only the "new and idle" rule fires
        let score = evasion_risk(&inputs(3, ConvertStatus::New, 0, 0));
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_week_of_silence() {
        // 10 days, still new: 0.3 + 0.2
        let score = evasion_risk(&inputs(10, ConvertStatus::New, 0, 0));
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_two_weeks_of_silence_stacks() {
        // 20 days, already contacted: 0.3 + 0.5
        let score = evasion_risk(&inputs(20, ConvertStatus::Contacted, 0, 0));
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_failed_contacts_clamp_to_one() {
        // 20 days + 4 failed attempts: 0.3 + 0.5 + 0.4 clamped to 1.0
        let score = evasion_risk(&inputs(20, ConvertStatus::Contacted, 4, 0));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_successful_contact_disarms_attempt_rule() {
        let score = evasion_risk(&inputs(0, ConvertStatus::Contacted, 5, 1));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_three_attempts_not_enough() {
        let score = evasion_risk(&inputs(0, ConvertStatus::New, 3, 0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_last_activity_overrides_created_at() {
        let mut i = inputs(30, ConvertStatus::Contacted, 0, 0);
        i.last_activity_at = Some(now() - Duration::days(1));
        assert_eq!(evasion_risk(&i), 0.0);
    }

    #[test]
    fn test_monotonic_in_days_inactive() {
        let mut prev = 0.0;
        for days in 0..40 {
            let score = evasion_risk(&inputs(days, ConvertStatus::Contacted, 0, 0));
            assert!(score >= prev, "score dropped at day {}", days);
            assert!((0.0..=1.0).contains(&score));
            prev = score;
        }
    }
}
