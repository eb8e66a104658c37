//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dispatcher with mock implementations.

use crate::catalog::{CatalogError, QueueItem, Series, SeriesSubmission, Tag};
use crate::render::Payload;
use crate::state_machine::{AuthLevel, CatalogSnapshot, NavigationState};
use async_trait::async_trait;
use std::sync::Arc;

// ============================================================================
// Chat Updates
// ============================================================================

/// Who sent an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    pub username: Option<String>,
}

/// A bot message carrying a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuRef {
    pub chat_id: i64,
    pub message_id: i64,
}

impl MenuRef {
    /// Key of the session attached to this message
    pub fn session_key(self) -> String {
        crate::db::session_key(self.chat_id, self.message_id)
    }
}

/// Transport-independent update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Text message typed into a chat
    Text {
        chat_id: i64,
        sender: Sender,
        text: String,
    },
    /// Inline button press; `menu` is `None` when the message is no longer available
    Callback {
        query_id: String,
        menu: Option<MenuRef>,
        sender: Sender,
        data: String,
    },
}

// ============================================================================
// Collaborators
// ============================================================================

/// Media catalog operations needed by the bot
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn lookup(&self, term: &str) -> Result<Vec<Series>, CatalogError>;

    async fn list_series(&self) -> Result<Vec<Series>, CatalogError>;

    async fn queue(&self) -> Result<Vec<QueueItem>, CatalogError>;

    /// Root folders, profiles and tags in one go
    async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError>;

    async fn tags(&self) -> Result<Vec<Tag>, CatalogError>;

    async fn search_season(&self, series_id: i64, season: i32) -> Result<(), CatalogError>;

    /// Add a new series, or update one already in the library
    async fn submit(&self, submission: &SeriesSubmission) -> Result<(), CatalogError>;

    async fn remove(&self, series_id: i64) -> Result<(), CatalogError>;
}

/// Storage for navigation sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, key: &str) -> Result<Option<NavigationState>, String>;

    async fn save_session(&self, key: &str, state: &NavigationState) -> Result<(), String>;

    async fn clear_session(&self, key: &str) -> Result<(), String>;
}

/// Storage for user authorization levels
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn auth_level(&self, user_id: i64) -> Result<Option<AuthLevel>, String>;

    async fn grant(&self, sender: &Sender, level: AuthLevel) -> Result<(), String>;
}

/// Combined storage trait for convenience
pub trait Storage: SessionStore + AuthStore {}
impl<T: SessionStore + AuthStore> Storage for T {}

/// Chat service the menus are displayed in
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Next batch of updates; blocks until some arrive or the poll times out
    async fn next_updates(&self) -> Result<Vec<Incoming>, String>;

    /// Send a new message and return its id
    async fn send(&self, chat_id: i64, payload: &Payload) -> Result<i64, String>;

    /// Replace the content of a menu message
    async fn edit(&self, menu: MenuRef, payload: &Payload) -> Result<(), String>;

    /// Remove a menu message that has been replaced
    async fn delete(&self, menu: MenuRef) -> Result<(), String>;

    /// Acknowledge a button press, optionally with a notice
    async fn answer(&self, query_id: &str, text: Option<&str>, alert: bool) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn lookup(&self, term: &str) -> Result<Vec<Series>, CatalogError> {
        (**self).lookup(term).await
    }

    async fn list_series(&self) -> Result<Vec<Series>, CatalogError> {
        (**self).list_series().await
    }

    async fn queue(&self) -> Result<Vec<QueueItem>, CatalogError> {
        (**self).queue().await
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        (**self).snapshot().await
    }

    async fn tags(&self) -> Result<Vec<Tag>, CatalogError> {
        (**self).tags().await
    }

    async fn search_season(&self, series_id: i64, season: i32) -> Result<(), CatalogError> {
        (**self).search_season(series_id, season).await
    }

    async fn submit(&self, submission: &SeriesSubmission) -> Result<(), CatalogError> {
        (**self).submit(submission).await
    }

    async fn remove(&self, series_id: i64) -> Result<(), CatalogError> {
        (**self).remove(series_id).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn load_session(&self, key: &str) -> Result<Option<NavigationState>, String> {
        (**self).load_session(key).await
    }

    async fn save_session(&self, key: &str, state: &NavigationState) -> Result<(), String> {
        (**self).save_session(key, state).await
    }

    async fn clear_session(&self, key: &str) -> Result<(), String> {
        (**self).clear_session(key).await
    }
}

#[async_trait]
impl<T: AuthStore + ?Sized> AuthStore for Arc<T> {
    async fn auth_level(&self, user_id: i64) -> Result<Option<AuthLevel>, String> {
        (**self).auth_level(user_id).await
    }

    async fn grant(&self, sender: &Sender, level: AuthLevel) -> Result<(), String> {
        (**self).grant(sender, level).await
    }
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn next_updates(&self) -> Result<Vec<Incoming>, String> {
        (**self).next_updates().await
    }

    async fn send(&self, chat_id: i64, payload: &Payload) -> Result<i64, String> {
        (**self).send(chat_id, payload).await
    }

    async fn edit(&self, menu: MenuRef, payload: &Payload) -> Result<(), String> {
        (**self).edit(menu, payload).await
    }

    async fn delete(&self, menu: MenuRef) -> Result<(), String> {
        (**self).delete(menu).await
    }

    async fn answer(&self, query_id: &str, text: Option<&str>, alert: bool) -> Result<(), String> {
        (**self).answer(query_id, text, alert).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

use crate::catalog::SonarrClient;
use crate::db::Database;
use crate::telegram::{InlineKeyboardMarkup, InputMediaPhoto, TelegramClient, Update};
use std::sync::atomic::{AtomicI64, Ordering};

#[async_trait]
impl CatalogClient for SonarrClient {
    async fn lookup(&self, term: &str) -> Result<Vec<Series>, CatalogError> {
        SonarrClient::lookup(self, term).await
    }

    async fn list_series(&self) -> Result<Vec<Series>, CatalogError> {
        SonarrClient::list_series(self).await
    }

    async fn queue(&self) -> Result<Vec<QueueItem>, CatalogError> {
        SonarrClient::queue(self).await
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let (root_folders, quality_profiles, language_profiles, tags) = tokio::try_join!(
            self.root_folders(),
            self.quality_profiles(),
            self.language_profiles(),
            SonarrClient::tags(self),
        )?;
        Ok(CatalogSnapshot {
            root_folders,
            quality_profiles,
            language_profiles,
            tags,
        })
    }

    async fn tags(&self) -> Result<Vec<Tag>, CatalogError> {
        SonarrClient::tags(self).await
    }

    async fn search_season(&self, series_id: i64, season: i32) -> Result<(), CatalogError> {
        SonarrClient::search_season(self, series_id, season).await
    }

    async fn submit(&self, submission: &SeriesSubmission) -> Result<(), CatalogError> {
        if submission.is_update() {
            let series = self.update_series(submission).await?;
            // PUT ignores addOptions, so the search has to be requested separately
            if submission.search_for_missing {
                if let Some(id) = series.id.or(submission.series.id) {
                    self.search_series(id).await?;
                }
            }
        } else {
            self.add_series(submission).await?;
        }
        Ok(())
    }

    async fn remove(&self, series_id: i64) -> Result<(), CatalogError> {
        self.remove_series(series_id).await
    }
}

/// Adapter to use Database as Storage
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseStorage {
    async fn load_session(&self, key: &str) -> Result<Option<NavigationState>, String> {
        self.db
            .get_session(key)
            .map(|session| session.map(|s| s.state))
            .map_err(|e| e.to_string())
    }

    async fn save_session(&self, key: &str, state: &NavigationState) -> Result<(), String> {
        self.db.save_session(key, state).map_err(|e| e.to_string())
    }

    async fn clear_session(&self, key: &str) -> Result<(), String> {
        self.db
            .delete_session(key)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl AuthStore for DatabaseStorage {
    async fn auth_level(&self, user_id: i64) -> Result<Option<AuthLevel>, String> {
        self.db.auth_level(user_id).map_err(|e| e.to_string())
    }

    async fn grant(&self, sender: &Sender, level: AuthLevel) -> Result<(), String> {
        self.db
            .set_auth_level(sender.user_id, sender.username.as_deref(), level)
            .map_err(|e| e.to_string())
    }
}

/// Adapter to use the Telegram Bot API as ChatTransport
pub struct TelegramTransport {
    client: TelegramClient,
    /// Next `update_id` to ask for
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(client: TelegramClient) -> Self {
        Self {
            client,
            offset: AtomicI64::new(0),
        }
    }
}

/// Keep the updates the bot reacts to: button presses and text messages
fn to_incoming(update: Update) -> Option<Incoming> {
    if let Some(query) = update.callback_query {
        return Some(Incoming::Callback {
            query_id: query.id,
            menu: query.message.map(|m| MenuRef {
                chat_id: m.chat.id,
                message_id: m.message_id,
            }),
            sender: Sender {
                user_id: query.from.id,
                username: query.from.username,
            },
            data: query.data.unwrap_or_default(),
        });
    }

    let message = update.message?;
    let from = message.from?;
    Some(Incoming::Text {
        chat_id: message.chat.id,
        sender: Sender {
            user_id: from.id,
            username: from.username,
        },
        text: message.text?,
    })
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn next_updates(&self) -> Result<Vec<Incoming>, String> {
        let offset = self.offset.load(Ordering::Relaxed);
        let updates = self
            .client
            .get_updates(offset)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Relaxed);
        }
        Ok(updates.into_iter().filter_map(to_incoming).collect())
    }

    async fn send(&self, chat_id: i64, payload: &Payload) -> Result<i64, String> {
        let markup = payload.keyboard.as_ref().map(InlineKeyboardMarkup::from);
        let sent = match &payload.photo {
            Some(photo) => {
                self.client
                    .send_photo(chat_id, photo, &payload.caption, markup.as_ref())
                    .await
            }
            None => {
                self.client
                    .send_message(chat_id, &payload.caption, markup.as_ref())
                    .await
            }
        };
        sent.map(|m| m.message_id).map_err(|e| e.to_string())
    }

    async fn edit(&self, menu: MenuRef, payload: &Payload) -> Result<(), String> {
        let MenuRef { chat_id, message_id } = menu;
        let markup = payload.keyboard.as_ref().map(InlineKeyboardMarkup::from);

        let result = match &payload.photo {
            Some(photo) => {
                let media = InputMediaPhoto::new(photo.as_str(), payload.caption.as_str());
                self.client
                    .edit_message_media(chat_id, message_id, &media, markup.as_ref())
                    .await
            }
            None => match self
                .client
                .edit_message_caption(chat_id, message_id, &payload.caption, markup.as_ref())
                .await
            {
                // Menus without a poster are plain text messages
                Err(e) if e.is_missing_caption() => {
                    self.client
                        .edit_message_text(chat_id, message_id, &payload.caption, markup.as_ref())
                        .await
                }
                other => other,
            },
        };

        match result {
            Err(e) if e.is_not_modified() => Ok(()),
            other => other.map_err(|e| e.to_string()),
        }
    }

    async fn delete(&self, menu: MenuRef) -> Result<(), String> {
        self.client
            .delete_message(menu.chat_id, menu.message_id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn answer(&self, query_id: &str, text: Option<&str>, alert: bool) -> Result<(), String> {
        self.client
            .answer_callback_query(query_id, text, alert)
            .await
            .map_err(|e| e.to_string())
    }
}
