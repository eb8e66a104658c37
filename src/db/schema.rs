//! Database schema and record types

use crate::state_machine::{AuthLevel, NavigationState};
use chrono::{DateTime, Utc};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    key TEXT PRIMARY KEY,
    state TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at);

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    username TEXT,
    auth_level INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Navigation session attached to one bot message
#[allow(dead_code)] // Timestamps kept for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub key: String,
    pub state: NavigationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat user with a granted authorization level
#[allow(dead_code)] // API completeness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub auth_level: AuthLevel,
    pub updated_at: DateTime<Utc>,
}

/// Session key for the menu shown in `message_id` of `chat_id`
pub fn session_key(chat_id: i64, message_id: i64) -> String {
    format!("{chat_id}:{message_id}")
}
