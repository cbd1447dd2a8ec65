//! Cell domain models.

use koinonia_db::queries::cells::CellRow;
use koinonia_db::queries::meetings::MeetingRow;
use serde::{Deserialize, Serialize};

/// A small recurring group with a leader and members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub supervision_id: Option<String>,
    pub leader_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Cell {
    /// Create a Cell from a database row.
    pub fn from_row(row: CellRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            supervision_id: row.supervision_id,
            leader_id: row.leader_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One held meeting of a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMeeting {
    pub id: String,
    pub cell_id: String,
    pub meeting_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl CellMeeting {
    /// Create a CellMeeting from a database row.
    pub fn from_row(row: MeetingRow) -> Self {
        Self {
            id: row.id,
            cell_id: row.cell_id,
            meeting_date: row.meeting_date,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// One person's attendance mark for a meeting being recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub person_id: String,
    pub present: bool,
}
