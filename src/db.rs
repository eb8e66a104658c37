//! Database module
//!
//! Provides persistence for navigation sessions and authorized users.

mod schema;

pub use schema::*;

use crate::state_machine::{AuthLevel, NavigationState};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt session {key}: {source}")]
    CorruptSession {
        key: String,
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unknown auth level {level} for user {user_id}")]
    UnknownAuthLevel { user_id: i64, level: i64 },
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Load the session stored under `key`
    pub fn get_session(&self, key: &str) -> DbResult<Option<Session>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT state, created_at, updated_at FROM sessions WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((state_json, created_at, updated_at)) = row else {
            return Ok(None);
        };
        let state: NavigationState =
            serde_json::from_str(&state_json).map_err(|source| DbError::CorruptSession {
                key: key.to_string(),
                source,
            })?;

        Ok(Some(Session {
            key: key.to_string(),
            state,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        }))
    }

    /// Insert or replace the session stored under `key`
    pub fn save_session(&self, key: &str, state: &NavigationState) -> DbResult<()> {
        let state_json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO sessions (key, state, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 state = excluded.state,
                 updated_at = excluded.updated_at",
            params![key, state_json, now],
        )?;
        Ok(())
    }

    /// Remove the session under `key`; returns whether one existed
    pub fn delete_session(&self, key: &str) -> DbResult<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM sessions WHERE key = ?1", params![key])?;
        Ok(changed > 0)
    }

    /// Drop sessions not touched since `cutoff`
    pub fn purge_sessions_before(&self, cutoff: DateTime<Utc>) -> DbResult<usize> {
        let removed = self.conn().execute(
            "DELETE FROM sessions WHERE updated_at < ?1",
            params![cutoff.to_rfc3339()],
        )?;
        Ok(removed)
    }

    // ==================== User Operations ====================

    pub fn get_user(&self, user_id: i64) -> DbResult<Option<User>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT username, auth_level, updated_at FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((username, level, updated_at)) = row else {
            return Ok(None);
        };
        let auth_level =
            AuthLevel::from_i64(level).ok_or(DbError::UnknownAuthLevel { user_id, level })?;

        Ok(Some(User {
            user_id,
            username,
            auth_level,
            updated_at: parse_datetime(&updated_at),
        }))
    }

    /// Authorization level of a user, `None` if never authorized
    pub fn auth_level(&self, user_id: i64) -> DbResult<Option<AuthLevel>> {
        Ok(self.get_user(user_id)?.map(|u| u.auth_level))
    }

    /// Record or change the level granted to a user
    pub fn set_auth_level(
        &self,
        user_id: i64,
        username: Option<&str>,
        level: AuthLevel,
    ) -> DbResult<()> {
        self.conn().execute(
            "INSERT INTO users (user_id, username, auth_level, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                auth_level = excluded.auth_level,
                updated_at = excluded.updated_at",
            params![user_id, username, level.as_i64(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
