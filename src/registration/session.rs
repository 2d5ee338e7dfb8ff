//! Per-user registration sessions.
//!
//! The store hands out one slot per user id; a slot's async mutex is held
//! for the whole state transition, so at most one update per user is ever
//! in flight while different users proceed in parallel. Sessions are
//! transient — a periodic sweep evicts conversations idle past the timeout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::registration::state::RegistrationState;

/// Transient state for one in-progress registration conversation.
#[derive(Debug, Clone)]
pub struct RegistrationSession {
    pub state: RegistrationState,
    pub name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub last_activity: DateTime<Utc>,
}

impl RegistrationSession {
    /// A fresh session, waiting for the user's name.
    pub fn new() -> Self {
        Self {
            state: RegistrationState::Name,
            name: None,
            title: None,
            department: None,
            last_activity: Utc::now(),
        }
    }

    /// Record activity on this session.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Whether the session has been idle longer than `timeout`.
    pub fn is_idle(&self, timeout: Duration) -> bool {
        (Utc::now() - self.last_activity)
            .to_std()
            .unwrap_or_default()
            > timeout
    }
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A per-user slot. `None` means no registration is in progress.
pub type SessionSlot = Arc<AsyncMutex<Option<RegistrationSession>>>;

/// Keyed session store with per-user locking and idle eviction.
pub struct SessionStore {
    slots: Mutex<HashMap<i64, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get (or create) the slot for a user.
    pub fn slot(&self, user_id: i64) -> SessionSlot {
        let mut slots = self.slots.lock().expect("session map poisoned");
        slots.entry(user_id).or_default().clone()
    }

    /// Number of slots currently held (for tests and logging).
    pub fn len(&self) -> usize {
        self.slots.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle longer than `timeout` and empty slots.
    ///
    /// Slots whose lock is held (a transition is in flight) are skipped and
    /// picked up on the next sweep. Returns the number of sessions evicted.
    pub fn prune_idle(&self, timeout: Duration) -> usize {
        let mut evicted = 0;
        let mut slots = self.slots.lock().expect("session map poisoned");

        slots.retain(|user_id, slot| {
            let Ok(mut guard) = slot.try_lock() else {
                return true;
            };
            match guard.as_ref() {
                Some(session) if session.is_idle(timeout) => {
                    tracing::info!(user_id, state = %session.state, "Evicting idle session");
                    *guard = None;
                    evicted += 1;
                    false
                }
                Some(_) => true,
                None => false,
            }
        });

        evicted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the periodic sweep for idle sessions.
pub fn spawn_prune_task(
    store: Arc<SessionStore>,
    timeout: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // skip the immediate first tick
        loop {
            ticker.tick().await;
            let evicted = store.prune_idle(timeout);
            if evicted > 0 {
                tracing::debug!(evicted, "Pruned idle registration sessions");
            }
        }
    })
}
