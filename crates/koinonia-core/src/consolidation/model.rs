//! Consolidation domain models.

use koinonia_db::queries::converts::ConvertRow;
use koinonia_db::queries::events::EventRow;
use serde::{Deserialize, Serialize};

/// A new convert moving through the consolidation funnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Convert {
    pub id: String,
    pub tenant_id: String,
    pub person_id: String,
    pub decision_date: String,
    pub decision_context: DecisionContext,
    pub status: ConvertStatus,
    pub consolidator_id: Option<String>,
    pub evasion_risk_score: f64,
    pub first_contact_at: Option<String>,
    pub last_activity_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Convert {
    /// Create a Convert from a database row.
    pub fn from_row(row: ConvertRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            person_id: row.person_id,
            decision_date: row.decision_date,
            decision_context: DecisionContext::from_str(&row.decision_context),
            status: ConvertStatus::from_str(&row.status),
            consolidator_id: row.consolidator_id,
            evasion_risk_score: row.evasion_risk_score,
            first_contact_at: row.first_contact_at,
            last_activity_at: row.last_activity_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The context of a decision registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionContext {
    Accept,
    Reconcile,
    Visitor,
    Transfer,
}

impl DecisionContext {
    /// Strict parse; unknown values are rejected at the boundary.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "reconcile" => Some(Self::Reconcile),
            "visitor" => Some(Self::Visitor),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Lenient parse for stored rows. Unknown values fall back to `Accept`.
    pub fn from_str(s: &str) -> Self {
        Self::try_from_str(s).unwrap_or(Self::Accept)
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reconcile => "reconcile",
            Self::Visitor => "visitor",
            Self::Transfer => "transfer",
        }
    }
}

/// Funnel status of a convert. `Lost` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertStatus {
    New,
    Contacted,
    Connected,
    Integrated,
    Lost,
}

impl ConvertStatus {
    /// Strict parse.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "connected" => Some(Self::Connected),
            "integrated" => Some(Self::Integrated),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Lenient parse for stored rows. Unknown values fall back to `New`.
    pub fn from_str(s: &str) -> Self {
        Self::try_from_str(s).unwrap_or(Self::New)
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Connected => "connected",
            Self::Integrated => "integrated",
            Self::Lost => "lost",
        }
    }

    /// Check if transition to another status is valid.
    ///
    /// Forward moves may skip steps. Backward moves of any distance are
    /// allowed as corrections, except out of `Lost`, which is terminal.
    /// Same-state is a no-op and always valid.
    pub fn can_transition_to(&self, to: &Self) -> bool {
        match (self, to) {
            (a, b) if a == b => true,
            // Lost is absorbing
            (Self::Lost, _) => false,
            (_, Self::Lost) => true,
            // Any move among the live funnel states is allowed; the funnel
            // expects forward progression but does not forbid correction.
            _ => true,
        }
    }
}

/// All funnel statuses, in funnel order.
pub const ALL_STATUSES: &[ConvertStatus] = &[
    ConvertStatus::New,
    ConvertStatus::Contacted,
    ConvertStatus::Connected,
    ConvertStatus::Integrated,
    ConvertStatus::Lost,
];

/// Event types in the consolidation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Decision,
    ContactAttempt,
    ContactSuccess,
    Visit,
    Note,
}

impl EventType {
    /// Strict parse.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "decision" => Some(Self::Decision),
            "contact_attempt" => Some(Self::ContactAttempt),
            "contact_success" => Some(Self::ContactSuccess),
            "visit" => Some(Self::Visit),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    /// Lenient parse for stored rows. Unknown values fall back to `Note`.
    pub fn from_str(s: &str) -> Self {
        Self::try_from_str(s).unwrap_or(Self::Note)
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::ContactAttempt => "contact_attempt",
            Self::ContactSuccess => "contact_success",
            Self::Visit => "visit",
            Self::Note => "note",
        }
    }
}

/// An immutable consolidation log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationEvent {
    pub id: String,
    pub tenant_id: String,
    pub convert_id: String,
    pub event_type: EventType,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

impl ConsolidationEvent {
    /// Create an event from a database row.
    pub fn from_row(row: EventRow) -> Self {
        let metadata = row
            .metadata
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok());
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            convert_id: row.convert_id,
            event_type: EventType::from_str(&row.event_type),
            description: row.description,
            metadata,
            created_at: row.created_at,
        }
    }
}

/// Converts counted per funnel status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelData {
    pub new: i64,
    pub contacted: i64,
    pub connected: i64,
    pub integrated: i64,
    pub lost: i64,
}

impl FunnelData {
    pub fn total(&self) -> i64 {
        self.new + self.contacted + self.connected + self.integrated + self.lost
    }
}

/// Dashboard stats for the consolidation funnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationStats {
    pub funnel: FunnelData,
    pub total: i64,
    pub avg_risk_score: f64,
    pub high_risk_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in ALL_STATUSES {
            assert_eq!(ConvertStatus::from_str(status.as_str()), *status);
        }
    }

    #[test]
    fn test_lost_is_absorbing() {
        for status in ALL_STATUSES {
            if *status == ConvertStatus::Lost {
                assert!(ConvertStatus::Lost.can_transition_to(status));
            } else {
                assert!(!ConvertStatus::Lost.can_transition_to(status));
            }
        }
    }

    #[test]
    fn test_any_live_state_can_be_lost() {
        assert!(ConvertStatus::New.can_transition_to(&ConvertStatus::Lost));
        assert!(ConvertStatus::Integrated.can_transition_to(&ConvertStatus::Lost));
    }

    #[test]
    fn test_forward_and_corrective_moves() {
        assert!(ConvertStatus::New.can_transition_to(&ConvertStatus::Contacted));
        assert!(ConvertStatus::New.can_transition_to(&ConvertStatus::Integrated));
        assert!(ConvertStatus::Connected.can_transition_to(&ConvertStatus::Contacted));
        assert!(ConvertStatus::Integrated.can_transition_to(&ConvertStatus::Contacted));
    }

    #[test]
    fn test_decision_context_strict_parse() {
        assert_eq!(
            DecisionContext::try_from_str("reconcile"),
            Some(DecisionContext::Reconcile)
        );
        assert_eq!(DecisionContext::try_from_str("baptism"), None);
    }
}
