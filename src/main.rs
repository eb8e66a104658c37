//! Sonarr Chat - Telegram bot for browsing and managing a Sonarr library
//!
//! Search results are shown as a menu message with inline buttons. Every
//! button press runs through a pure navigation state machine whose state is
//! persisted per message.

mod catalog;
mod command;
mod config;
mod db;
mod render;
mod runtime;
mod state_machine;
mod telegram;

use catalog::SonarrClient;
use config::BotConfig;
use db::Database;
use runtime::{DatabaseStorage, Dispatcher, ProductionDispatcher, TelegramTransport};
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sessions untouched for this long are dropped at startup
const SESSION_RETENTION_DAYS: i64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonarr_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = BotConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    let purged = db.purge_sessions_before(
        chrono::Utc::now() - chrono::Duration::days(SESSION_RETENTION_DAYS),
    )?;
    if purged > 0 {
        tracing::info!(purged, "Dropped stale sessions");
    }

    let sonarr = Arc::new(SonarrClient::new(&config.sonarr_url, config.sonarr_api_key.clone())?);
    let telegram = TelegramClient::new(&config.telegram_token, config.poll_timeout)?;

    if config.user_password.is_none()
        && config.mod_password.is_none()
        && config.admin_password.is_none()
    {
        tracing::warn!("No auth passwords configured; nobody can authorize with /auth");
    }

    let dispatcher: ProductionDispatcher = Dispatcher::new(
        sonarr,
        DatabaseStorage::new(db),
        TelegramTransport::new(telegram),
        config,
    );

    // Stop polling on Ctrl-C
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown requested");
        shutdown.cancel();
    });

    dispatcher.run(cancel).await;
    Ok(())
}
