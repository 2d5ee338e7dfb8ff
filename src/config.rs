//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token. `None` means run with the CLI channel only.
    pub bot_token: Option<SecretString>,
    /// Path to the user-profile database file.
    pub db_path: PathBuf,
    /// Idle timeout after which an abandoned registration session is evicted.
    pub session_idle_timeout: Duration,
    /// How often the session sweep runs.
    pub prune_interval: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            db_path: PathBuf::from("./data/rollcall.db"),
            session_idle_timeout: Duration::from_secs(30 * 60),
            prune_interval: Duration::from_secs(60),
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// `TELEGRAM_BOT_TOKEN` — optional; without it the bot runs on stdin.
    /// `ROLLCALL_DB_PATH` — optional, defaults to `./data/rollcall.db`.
    /// `ROLLCALL_SESSION_TIMEOUT_MIN` — optional, defaults to 30 minutes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.trim().is_empty() {
                config.bot_token = Some(SecretString::from(token));
            }
        }

        if let Ok(path) = std::env::var("ROLLCALL_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(minutes) = std::env::var("ROLLCALL_SESSION_TIMEOUT_MIN") {
            let minutes: u64 =
                minutes
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "ROLLCALL_SESSION_TIMEOUT_MIN".into(),
                        message: format!("expected a number of minutes, got {minutes:?}"),
                    })?;
            config.session_idle_timeout = Duration::from_secs(minutes * 60);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BotConfig::default();
        assert!(config.bot_token.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/rollcall.db"));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }
}
