//! Mock implementations for testing
//!
//! These mocks enable dispatcher testing without real I/O.

use super::traits::*;
use crate::catalog::{CatalogError, QueueItem, Series, SeriesSubmission, Tag};
use crate::render::Payload;
use crate::state_machine::{AuthLevel, CatalogSnapshot, NavigationState};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Catalog
// ============================================================================

/// Catalog returning queued lookups and recording every mutation
pub struct MockCatalog {
    snapshot: Mutex<CatalogSnapshot>,
    lookup_results: Mutex<VecDeque<Vec<Series>>>,
    library: Mutex<Vec<Series>>,
    queue: Mutex<Vec<QueueItem>>,
    submit_error: Mutex<Option<CatalogError>>,
    remove_error: Mutex<Option<CatalogError>>,
    lookups: Mutex<Vec<String>>,
    /// Record of `(series_id, season)` searches
    season_searches: Mutex<Vec<(i64, i32)>>,
    submissions: Mutex<Vec<SeriesSubmission>>,
    removals: Mutex<Vec<i64>>,
}

impl MockCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            lookup_results: Mutex::new(VecDeque::new()),
            library: Mutex::new(Vec::new()),
            queue: Mutex::new(Vec::new()),
            submit_error: Mutex::new(None),
            remove_error: Mutex::new(None),
            lookups: Mutex::new(Vec::new()),
            season_searches: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
        }
    }

    /// Queue the results of the next lookup
    pub fn queue_lookup(&self, results: Vec<Series>) {
        self.lookup_results.lock().unwrap().push_back(results);
    }

    pub fn set_library(&self, series: Vec<Series>) {
        *self.library.lock().unwrap() = series;
    }

    pub fn set_queue(&self, items: Vec<QueueItem>) {
        *self.queue.lock().unwrap() = items;
    }

    pub fn set_tags(&self, tags: Vec<Tag>) {
        self.snapshot.lock().unwrap().tags = tags;
    }

    /// Make every following submit fail with `error`
    pub fn fail_submit(&self, error: CatalogError) {
        *self.submit_error.lock().unwrap() = Some(error);
    }

    /// Make every following remove fail with `error`
    pub fn fail_remove(&self, error: CatalogError) {
        *self.remove_error.lock().unwrap() = Some(error);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn season_searches(&self) -> Vec<(i64, i32)> {
        self.season_searches.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SeriesSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<i64> {
        self.removals.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn lookup(&self, term: &str) -> Result<Vec<Series>, CatalogError> {
        self.lookups.lock().unwrap().push(term.to_string());
        Ok(self.lookup_results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn list_series(&self) -> Result<Vec<Series>, CatalogError> {
        Ok(self.library.lock().unwrap().clone())
    }

    async fn queue(&self) -> Result<Vec<QueueItem>, CatalogError> {
        Ok(self.queue.lock().unwrap().clone())
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn tags(&self) -> Result<Vec<Tag>, CatalogError> {
        Ok(self.snapshot.lock().unwrap().tags.clone())
    }

    async fn search_season(&self, series_id: i64, season: i32) -> Result<(), CatalogError> {
        self.season_searches.lock().unwrap().push((series_id, season));
        Ok(())
    }

    async fn submit(&self, submission: &SeriesSubmission) -> Result<(), CatalogError> {
        self.submissions.lock().unwrap().push(submission.clone());
        replay(&self.submit_error)
    }

    async fn remove(&self, series_id: i64) -> Result<(), CatalogError> {
        self.removals.lock().unwrap().push(series_id);
        replay(&self.remove_error)
    }
}

/// Fail with a copy of the configured error, if any
fn replay(error: &Mutex<Option<CatalogError>>) -> Result<(), CatalogError> {
    match &*error.lock().unwrap() {
        Some(error) => Err(CatalogError::new(error.kind, error.message.clone())),
        None => Ok(()),
    }
}

// ============================================================================
// In-memory Storage
// ============================================================================

/// Sessions and auth levels kept in hash maps
#[derive(Default)]
pub struct MemoryStorage {
    sessions: Mutex<HashMap<String, NavigationState>>,
    levels: Mutex<HashMap<i64, AuthLevel>>,
}

impl MemoryStorage {
    pub fn set_level(&self, user_id: i64, level: AuthLevel) {
        self.levels.lock().unwrap().insert(user_id, level);
    }

    pub fn level(&self, user_id: i64) -> Option<AuthLevel> {
        self.levels.lock().unwrap().get(&user_id).copied()
    }

    pub fn session(&self, key: &str) -> Option<NavigationState> {
        self.sessions.lock().unwrap().get(key).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemoryStorage {
    async fn load_session(&self, key: &str) -> Result<Option<NavigationState>, String> {
        Ok(self.session(key))
    }

    async fn save_session(&self, key: &str, state: &NavigationState) -> Result<(), String> {
        self.sessions
            .lock()
            .unwrap()
            .insert(key.to_string(), state.clone());
        Ok(())
    }

    async fn clear_session(&self, key: &str) -> Result<(), String> {
        self.sessions.lock().unwrap().remove(key);
        Ok(())
    }
}

#[async_trait]
impl AuthStore for MemoryStorage {
    async fn auth_level(&self, user_id: i64) -> Result<Option<AuthLevel>, String> {
        Ok(self.level(user_id))
    }

    async fn grant(&self, sender: &Sender, level: AuthLevel) -> Result<(), String> {
        self.set_level(sender.user_id, level);
        Ok(())
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMessage {
    pub menu: MenuRef,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub query_id: String,
    pub text: Option<String>,
    pub alert: bool,
}

/// Transport replaying queued update batches and recording output
#[derive(Default)]
pub struct MockTransport {
    batches: Mutex<VecDeque<Vec<Incoming>>>,
    next_message_id: Mutex<i64>,
    sent: Mutex<Vec<SentMessage>>,
    edits: Mutex<Vec<EditedMessage>>,
    answers: Mutex<Vec<Answer>>,
    deleted: Mutex<Vec<MenuRef>>,
}

impl MockTransport {
    pub fn queue_updates(&self, batch: Vec<Incoming>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn edits(&self) -> Vec<EditedMessage> {
        self.edits.lock().unwrap().clone()
    }

    pub fn last_edit(&self) -> Option<EditedMessage> {
        self.edits.lock().unwrap().last().cloned()
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.answers.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<MenuRef> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn next_updates(&self) -> Result<Vec<Incoming>, String> {
        let batch = self.batches.lock().unwrap().pop_front();
        match batch {
            Some(batch) => Ok(batch),
            None => {
                // Behave like an empty long poll
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send(&self, chat_id: i64, payload: &Payload) -> Result<i64, String> {
        let message_id = {
            let mut next = self.next_message_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            message_id,
            payload: payload.clone(),
        });
        Ok(message_id)
    }

    async fn edit(&self, menu: MenuRef, payload: &Payload) -> Result<(), String> {
        self.edits.lock().unwrap().push(EditedMessage {
            menu,
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn delete(&self, menu: MenuRef) -> Result<(), String> {
        self.deleted.lock().unwrap().push(menu);
        Ok(())
    }

    async fn answer(&self, query_id: &str, text: Option<&str>, alert: bool) -> Result<(), String> {
        self.answers.lock().unwrap().push(Answer {
            query_id: query_id.to_string(),
            text: text.map(str::to_string),
            alert,
        });
        Ok(())
    }
}
