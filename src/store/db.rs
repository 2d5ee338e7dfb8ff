//! libSQL store — async `UserStore` implementation.
//!
//! Supports local file and in-memory databases. All statements are
//! parameterized; user-controlled values only ever travel as bound
//! parameters, never spliced into statement text.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::debug;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::profile::{Role, UserProfile};
use crate::store::UserStore;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&store.conn).await?;
        tracing::info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests and local runs).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&store.conn).await?;
        Ok(store)
    }

    // ── Gateway primitives ──────────────────────────────────────────
    //
    // Every driver fault surfaces as a typed `DatabaseError`; a select
    // failure is an error, not an empty result set.

    /// Run a select statement, returning the full ordered result set.
    ///
    /// Column values are copied out of each row before the cursor advances:
    /// a `libsql::Row` is a live view into the statement cursor, and its
    /// values read back as `Null` once `next()` moves past it.
    async fn run_select(
        &self,
        stmt: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<Vec<libsql::Value>>, DatabaseError> {
        debug!(stmt, "SELECT");
        let mut rows = self
            .conn
            .query(stmt, params)
            .await
            .map_err(|e| DatabaseError::Query(format!("{stmt}: {e}")))?;

        let column_count = rows.column_count();
        let mut result = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => {
                    let mut values = Vec::with_capacity(column_count as usize);
                    for i in 0..column_count {
                        let value = row
                            .get_value(i)
                            .map_err(|e| DatabaseError::Query(format!("{stmt}: {e}")))?;
                        values.push(value);
                    }
                    result.push(values);
                }
                Ok(None) => break,
                Err(e) => return Err(DatabaseError::Query(format!("{stmt}: {e}"))),
            }
        }
        Ok(result)
    }

    /// Run an insert or update statement, returning the affected row count.
    async fn run_execute(
        &self,
        stmt: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<u64, DatabaseError> {
        debug!(stmt, "EXECUTE");
        self.conn.execute(stmt, params).await.map_err(|e| {
            let text = e.to_string();
            if text.contains("UNIQUE") || text.contains("constraint") {
                DatabaseError::Constraint(format!("{stmt}: {text}"))
            } else {
                DatabaseError::Query(format!("{stmt}: {text}"))
            }
        })
    }
}

const USER_COLUMNS: &str = "user_id, name, title, department, role, approved";

/// Extract an integer column value, mirroring the driver's own conversion.
fn value_to_i64(value: &libsql::Value) -> Result<i64, libsql::Error> {
    match value {
        libsql::Value::Null => Err(libsql::Error::NullValue),
        libsql::Value::Integer(i) => Ok(*i),
        _ => Err(libsql::Error::InvalidColumnType),
    }
}

/// Extract a text column value, mirroring the driver's own conversion.
fn value_to_string(value: &libsql::Value) -> Result<String, libsql::Error> {
    match value {
        libsql::Value::Null => Err(libsql::Error::NullValue),
        libsql::Value::Text(s) => Ok(s.clone()),
        _ => Err(libsql::Error::InvalidColumnType),
    }
}

/// Map a row's column values to a UserProfile. Column order matches USER_COLUMNS.
fn row_to_profile(row: &[libsql::Value]) -> Result<UserProfile, libsql::Error> {
    let role_str = value_to_string(&row[4])?;
    let approved = value_to_i64(&row[5])?;
    Ok(UserProfile {
        user_id: value_to_i64(&row[0])?,
        name: value_to_string(&row[1])?,
        title: value_to_string(&row[2])?,
        department: value_to_string(&row[3])?,
        role: Role::from_db_str(&role_str),
        approved: approved != 0,
    })
}

#[async_trait]
impl UserStore for LibSqlStore {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserProfile>, DatabaseError> {
        let rows = self
            .run_select(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                params![user_id],
            )
            .await?;

        match rows.first() {
            Some(row) => {
                let profile = row_to_profile(row)
                    .map_err(|e| DatabaseError::Query(format!("find_user row parse: {e}")))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn insert_user(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        // All six columns bound positionally; a duplicate id fails the
        // primary-key constraint rather than overwriting the row.
        self.run_execute(
            "INSERT INTO users (user_id, name, title, department, role, approved)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.user_id,
                profile.name.as_str(),
                profile.title.as_str(),
                profile.department.as_str(),
                profile.role.as_db_str(),
                profile.approved as i64,
            ],
        )
        .await?;

        debug!(user_id = profile.user_id, "User profile inserted");
        Ok(())
    }

    async fn set_approval(&self, user_id: i64, approved: bool) -> Result<bool, DatabaseError> {
        let affected = self
            .run_execute(
                "UPDATE users SET approved = ?1 WHERE user_id = ?2",
                params![approved as i64, user_id],
            )
            .await?;

        debug!(user_id, approved, "User approval updated");
        Ok(affected > 0)
    }

    async fn find_in_charge(&self, department: &str) -> Result<Option<i64>, DatabaseError> {
        // Lowest user id wins — deterministic pick among several ICs.
        let rows = self
            .run_select(
                "SELECT user_id FROM users
                 WHERE department = ?1 AND role = 'IC'
                 ORDER BY user_id ASC LIMIT 1",
                params![department],
            )
            .await?;

        match rows.first() {
            Some(row) => {
                let id = value_to_i64(&row[0])
                    .map_err(|e| DatabaseError::Query(format!("find_in_charge: {e}")))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn find_any_admin(&self) -> Result<Option<i64>, DatabaseError> {
        let rows = self
            .run_select(
                "SELECT user_id FROM users WHERE role = 'Admin' ORDER BY user_id ASC LIMIT 1",
                (),
            )
            .await?;

        match rows.first() {
            Some(row) => {
                let id = value_to_i64(&row[0])
                    .map_err(|e| DatabaseError::Query(format!("find_any_admin: {e}")))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}
