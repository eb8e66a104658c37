//! Telegram Bot API wire types
//!
//! Only the fields the bot reads or writes are modelled.

use crate::render::{ButtonKind, Keyboard};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the originating message is too old
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        let inline_keyboard = keyboard
            .rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|button| match button.kind {
                        ButtonKind::Callback(action) => InlineKeyboardButton {
                            text: button.label,
                            callback_data: Some(action.to_callback_data()),
                            url: None,
                        },
                        ButtonKind::Url(url) => InlineKeyboardButton {
                            text: button.label,
                            callback_data: None,
                            url: Some(url),
                        },
                    })
                    .collect()
            })
            .collect();
        Self { inline_keyboard }
    }
}

/// `InputMediaPhoto` for `editMessageMedia`
#[derive(Debug, Clone, Serialize)]
pub struct InputMediaPhoto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: String,
    pub caption: String,
}

impl InputMediaPhoto {
    pub fn new(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            kind: "photo",
            media: url.into(),
            caption: caption.into(),
        }
    }
}

/// Subset of a sent message we need back
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}
