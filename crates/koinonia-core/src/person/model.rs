//! Person domain models.

use koinonia_db::queries::people::PersonRow;
use serde::{Deserialize, Serialize};

/// A person known to the church (member, visitor, leader...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub tenant_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub neighborhood: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub membership_status: MembershipStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Person {
    /// Create a Person from a database row.
    pub fn from_row(row: PersonRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            full_name: row.full_name,
            phone: row.phone,
            neighborhood: row.neighborhood,
            birth_date: row.birth_date,
            gender: row.gender,
            membership_status: MembershipStatus::from_str(&row.membership_status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Visitor,
    Regular,
    Member,
    Leader,
}

impl MembershipStatus {
    /// Parse from string. Unknown values fall back to `Visitor`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "regular" => Self::Regular,
            "member" => Self::Member,
            "leader" => Self::Leader,
            _ => Self::Visitor,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Regular => "regular",
            Self::Member => "member",
            Self::Leader => "leader",
        }
    }
}
