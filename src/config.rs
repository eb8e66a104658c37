//! Environment configuration

use crate::state_machine::AuthLevel;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_COMMAND: &str = "sonarr";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Bot settings read once at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub sonarr_url: String,
    pub sonarr_api_key: String,
    pub db_path: PathBuf,
    /// Command word, without the leading slash
    pub command: String,
    pub user_password: Option<String>,
    pub mod_password: Option<String>,
    pub admin_password: Option<String>,
    /// Long-polling timeout for `getUpdates`
    pub poll_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| non_empty(name).ok_or(ConfigError::Missing(name));

        let db_path = non_empty("SONARR_CHAT_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".sonarr-chat").join("sessions.db")
            },
            PathBuf::from,
        );

        let poll_timeout = match non_empty("SONARR_CHAT_POLL_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name: "SONARR_CHAT_POLL_TIMEOUT",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        };

        Ok(Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            sonarr_url: required("SONARR_URL")?.trim_end_matches('/').to_string(),
            sonarr_api_key: required("SONARR_API_KEY")?,
            db_path,
            command: non_empty("SONARR_CHAT_COMMAND").map_or_else(
                || DEFAULT_COMMAND.to_string(),
                |c| c.trim_start_matches('/').to_string(),
            ),
            user_password: non_empty("SONARR_CHAT_USER_PASSWORD"),
            mod_password: non_empty("SONARR_CHAT_MOD_PASSWORD"),
            admin_password: non_empty("SONARR_CHAT_ADMIN_PASSWORD"),
            poll_timeout,
        })
    }

    /// Level granted by `/auth <password>`, highest match first
    pub fn level_for_password(&self, password: &str) -> Option<AuthLevel> {
        [
            (&self.admin_password, AuthLevel::Admin),
            (&self.mod_password, AuthLevel::Moderator),
            (&self.user_password, AuthLevel::User),
        ]
        .into_iter()
        .find(|(expected, _)| expected.as_deref() == Some(password))
        .map(|(_, level)| level)
    }
}
