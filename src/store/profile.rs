//! User profile model.

use serde::{Deserialize, Serialize};

/// Role of a registered user.
///
/// `Ic` (in-charge) approves registrations for one department; `Admin`
/// approves for any department and is the notification fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Ic,
    Admin,
}

impl Role {
    /// DB string for this role. These values are part of the schema contract.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Ic => "IC",
            Self::Admin => "Admin",
        }
    }

    /// Parse a role string from the DB. Unknown values read back as `User`.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "IC" => Self::Ic,
            "Admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

/// A persisted user profile. One row per chat user id, created exactly once
/// by the registration flow; `approved` is flipped later by an approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Chat platform's numeric user identifier (primary key).
    pub user_id: i64,
    pub name: String,
    pub title: String,
    pub department: String,
    pub role: Role,
    pub approved: bool,
}

impl UserProfile {
    /// Build the profile a freshly completed registration produces:
    /// role `User`, pending approval.
    pub fn pending(user_id: i64, name: &str, title: &str, department: &str) -> Self {
        Self {
            user_id,
            name: name.to_string(),
            title: title.to_string(),
            department: department.to_string(),
            role: Role::User,
            approved: false,
        }
    }
}
