//! Bot dispatcher — wires the channel to the registration flow.
//!
//! Each inbound message is handled on its own task; the per-user session
//! lock inside the `Registrar` serializes turns for a single user while
//! different users proceed in parallel.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, OutgoingResponse};
use crate::config::BotConfig;
use crate::error::Error;
use crate::registration::{Registrar, prompts, spawn_prune_task};

/// The bot main loop.
pub struct Bot {
    config: BotConfig,
    channel: Arc<dyn Channel>,
    registrar: Arc<Registrar>,
}

impl Bot {
    pub fn new(config: BotConfig, channel: Arc<dyn Channel>, registrar: Arc<Registrar>) -> Self {
        Self {
            config,
            channel,
            registrar,
        }
    }

    /// Run until ctrl-c or the channel stream ends.
    pub async fn run(self) -> Result<(), Error> {
        let mut messages = self.channel.start().await?;

        let prune_handle = spawn_prune_task(
            Arc::clone(self.registrar.sessions()),
            self.config.session_idle_timeout,
            self.config.prune_interval,
        );

        tracing::info!(channel = self.channel.name(), "Bot ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = messages.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("Channel stream ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            let registrar = Arc::clone(&self.registrar);
            let channel = Arc::clone(&self.channel);
            tokio::spawn(async move {
                let replies = dispatch(&registrar, message.user_id, &message.content).await;
                for reply in replies {
                    if let Err(e) = channel
                        .respond(&message, OutgoingResponse::text(reply))
                        .await
                    {
                        tracing::error!(user_id = message.user_id, error = %e, "Failed to send reply");
                    }
                }
            });
        }

        prune_handle.abort();
        self.channel.shutdown().await?;
        Ok(())
    }
}

/// Route one message: `/help` is answered inline, everything else goes to
/// the registration state machine.
pub async fn dispatch(registrar: &Registrar, user_id: i64, text: &str) -> Vec<String> {
    if text.trim() == "/help" {
        return vec![prompts::HELP.to_string()];
    }
    registrar.handle(user_id, text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::registration::SessionStore;
    use crate::store::LibSqlStore;

    async fn registrar() -> Registrar {
        let store = Arc::new(LibSqlStore::open_in_memory().await.unwrap());
        Registrar::new(store, Arc::new(LogNotifier), Arc::new(SessionStore::new()))
    }

    #[tokio::test]
    async fn help_is_answered_inline() {
        let registrar = registrar().await;
        let replies = dispatch(&registrar, 42, "/help").await;
        assert_eq!(replies, vec![prompts::HELP]);
        // Help never opens a session.
        assert!(registrar.sessions().slot(42).lock().await.is_none());
    }

    #[tokio::test]
    async fn other_commands_reach_the_state_machine() {
        let registrar = registrar().await;
        let replies = dispatch(&registrar, 42, "/register").await;
        assert_eq!(replies, vec![prompts::WELCOME]);
        assert!(registrar.sessions().slot(42).lock().await.is_some());
    }
}
