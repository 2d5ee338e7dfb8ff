//! Approver notification routing.
//!
//! A completed registration pings the department's in-charge, falling back
//! to any administrator. Best-effort: finding nobody is reported to the
//! caller, not to the end user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ChannelError, Error};
use crate::registration::prompts;
use crate::store::UserStore;

/// Sends a direct message to a user by id.
///
/// Implemented by the Telegram channel; tests and CLI runs substitute stubs.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_direct(&self, user_id: i64, text: &str) -> Result<(), ChannelError>;
}

/// Notifier for runs without a chat transport — logs instead of sending.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_direct(&self, user_id: i64, text: &str) -> Result<(), ChannelError> {
        tracing::info!(user_id, text, "Notification (log only)");
        Ok(())
    }
}

/// Routes a registration notification to the responsible approver.
pub struct NotificationRouter {
    store: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationRouter {
    pub fn new(store: Arc<dyn UserStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Notify the approver responsible for `department` about a new request.
    ///
    /// Sends at most one message. Returns whether a recipient was found;
    /// store or send faults propagate as errors. The recipient pick is
    /// deterministic: lowest user id among eligible rows.
    pub async fn notify(
        &self,
        name: &str,
        title: &str,
        department: &str,
    ) -> Result<bool, Error> {
        tracing::info!(department, "Sending notification to person in-charge");

        if let Some(ic) = self.store.find_in_charge(department).await? {
            self.notifier
                .send_direct(ic, &prompts::notify_in_charge(title, name))
                .await?;
            return Ok(true);
        }

        match self.store.find_any_admin().await? {
            Some(admin) => {
                self.notifier
                    .send_direct(admin, &prompts::notify_admin(title, name, department))
                    .await?;
                Ok(true)
            }
            None => {
                tracing::warn!(department, "No in-charge or admin found to notify");
                Ok(false)
            }
        }
    }
}
