use std::sync::Arc;

use rollcall::channels::{Channel, CliChannel, TelegramChannel};
use rollcall::config::BotConfig;
use rollcall::dispatcher::Bot;
use rollcall::notify::{LogNotifier, Notifier};
use rollcall::registration::{Registrar, SessionStore};
use rollcall::store::LibSqlStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("📋 rollcall v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!(
        "   Session timeout: {}s",
        config.session_idle_timeout.as_secs()
    );

    let store = Arc::new(LibSqlStore::open(&config.db_path).await?);

    // Telegram when a bot token is configured, stdin otherwise.
    let (channel, notifier): (Arc<dyn Channel>, Arc<dyn Notifier>) =
        match config.bot_token.clone() {
            Some(token) => {
                eprintln!("   Channel: telegram\n");
                let telegram = Arc::new(TelegramChannel::new(token));
                telegram.health_check().await?;
                let channel: Arc<dyn Channel> = telegram.clone();
                let notifier: Arc<dyn Notifier> = telegram;
                (channel, notifier)
            }
            None => {
                eprintln!("   Channel: cli (set TELEGRAM_BOT_TOKEN for Telegram)\n");
                let channel: Arc<dyn Channel> = Arc::new(CliChannel::new());
                let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
                (channel, notifier)
            }
        };

    let registrar = Arc::new(Registrar::new(
        store,
        notifier,
        Arc::new(SessionStore::new()),
    ));

    let bot = Bot::new(config, channel, registrar);
    bot.run().await?;

    Ok(())
}
