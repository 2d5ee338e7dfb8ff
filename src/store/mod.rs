//! Persistence layer — libSQL-backed storage for user profiles.

pub mod db;
pub mod migrations;
pub mod profile;

use async_trait::async_trait;

use crate::error::DatabaseError;

pub use db::LibSqlStore;
pub use profile::{Role, UserProfile};

/// Backend-agnostic user-profile store.
///
/// Injected into the registration flow as `Arc<dyn UserStore>` so tests can
/// substitute stubs (and so nothing in the flow touches a global handle).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a profile by user id.
    async fn find_user(&self, user_id: i64) -> Result<Option<UserProfile>, DatabaseError>;

    /// Insert a new profile. Fails on a duplicate user id; no partial row
    /// exists after a failure.
    async fn insert_user(&self, profile: &UserProfile) -> Result<(), DatabaseError>;

    /// Set the approval flag. Returns whether a row was updated.
    async fn set_approval(&self, user_id: i64, approved: bool) -> Result<bool, DatabaseError>;

    /// Find the in-charge for a department, lowest user id first.
    async fn find_in_charge(&self, department: &str) -> Result<Option<i64>, DatabaseError>;

    /// Find any administrator, lowest user id first.
    async fn find_any_admin(&self) -> Result<Option<i64>, DatabaseError>;
}
