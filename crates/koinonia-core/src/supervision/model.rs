//! Supervision domain models.

use koinonia_db::queries::alerts::AlertRow;
use koinonia_db::queries::supervisions::SupervisionRow;
use serde::{Deserialize, Serialize};

/// A hierarchical grouping of cells under a supervisor. May nest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supervision {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Supervision {
    /// Create a Supervision from a database row.
    pub fn from_row(row: SupervisionRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            parent_id: row.parent_id,
            supervisor_id: row.supervisor_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Health figures for one cell on the supervision dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellHealth {
    pub cell_id: String,
    pub name: String,
    /// Percentage over the recent-meeting window; 0 with no meetings.
    pub avg_presence: i64,
    pub last_meeting_date: Option<String>,
    pub member_count: i64,
}

/// Rolled-up health figures for a supervision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionDashboard {
    pub total_cells: i64,
    pub total_members: i64,
    /// Percentage of cells that met within the active window.
    pub active_rate: i64,
    /// Unweighted mean of the cells' presence percentages.
    pub avg_presence: i64,
    /// Per-cell figures; not pre-sorted, consumers rank it.
    pub cell_stats: Vec<CellHealth>,
}

impl SupervisionDashboard {
    pub fn empty() -> Self {
        Self {
            total_cells: 0,
            total_members: 0,
            active_rate: 0,
            avg_presence: 0,
            cell_stats: Vec::new(),
        }
    }
}

/// Alert categories raised by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    MissingReport,
    PresenceDrop,
}

impl AlertType {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "presence_drop" => Self::PresenceDrop,
            _ => Self::MissingReport,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingReport => "missing_report",
            Self::PresenceDrop => "presence_drop",
        }
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A raised supervision alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionAlert {
    pub id: String,
    pub tenant_id: String,
    pub supervision_id: Option<String>,
    pub cell_id: Option<String>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub is_resolved: bool,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl SupervisionAlert {
    /// Create an alert from a database row.
    pub fn from_row(row: AlertRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            supervision_id: row.supervision_id,
            cell_id: row.cell_id,
            alert_type: AlertType::from_str(&row.alert_type),
            severity: AlertSeverity::from_str(&row.severity),
            message: row.message,
            is_resolved: row.is_resolved,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

/// Traffic-light summary of a supervision's unresolved alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    /// Derive from the severities of unresolved alerts.
    pub fn from_severities(severities: &[AlertSeverity]) -> Self {
        if severities.is_empty() {
            Self::Green
        } else if severities
            .iter()
            .any(|s| matches!(s, AlertSeverity::High | AlertSeverity::Critical))
        {
            Self::Red
        } else {
            Self::Yellow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_from_severities() {
        assert_eq!(HealthStatus::from_severities(&[]), HealthStatus::Green);
        assert_eq!(
            HealthStatus::from_severities(&[AlertSeverity::Medium]),
            HealthStatus::Yellow
        );
        assert_eq!(
            HealthStatus::from_severities(&[AlertSeverity::Medium, AlertSeverity::High]),
            HealthStatus::Red
        );
        assert_eq!(
            HealthStatus::from_severities(&[AlertSeverity::Critical]),
            HealthStatus::Red
        );
    }
}
