//! Telegram Bot API client
//!
//! Long-polls `getUpdates` and sends or edits the menu messages. All calls
//! are JSON POSTs to `https://api.telegram.org/bot<token>/<method>`.

mod types;

pub use types::*;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use thiserror::Error;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },
    #[error("Unexpected Telegram response: {0}")]
    Decode(String),
}

impl TelegramError {
    fn api_description(&self) -> Option<&str> {
        match self {
            TelegramError::Api { description, .. } => Some(description),
            _ => None,
        }
    }

    /// Edit rejected because nothing changed
    pub fn is_not_modified(&self) -> bool {
        self.api_description()
            .is_some_and(|d| d.contains("message is not modified"))
    }

    /// Caption edit attempted on a text-only message
    pub fn is_missing_caption(&self) -> bool {
        self.api_description()
            .is_some_and(|d| d.contains("no caption"))
    }
}

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        Self::with_base_url(API_BASE, token, poll_timeout)
    }

    pub fn with_base_url(
        api_base: &str,
        token: &str,
        poll_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        // Long polls hold the connection for `poll_timeout`
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_base.trim_end_matches('/')),
            poll_timeout,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<T, TelegramError> {
        let start = Instant::now();
        let url = format!("{}/{method}", self.base_url);

        let result = async {
            let response = self.client.post(&url).json(body).send().await?;
            let bytes = response.bytes().await?;
            let envelope: ApiResponse<T> =
                serde_json::from_slice(&bytes).map_err(|e| TelegramError::Decode(e.to_string()))?;
            match envelope {
                ApiResponse {
                    ok: true,
                    result: Some(result),
                    ..
                } => Ok(result),
                ApiResponse {
                    description,
                    error_code,
                    ..
                } => Err(TelegramError::Api {
                    code: error_code,
                    description: description.unwrap_or_else(|| "no description".to_string()),
                }),
            }
        }
        .await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => tracing::debug!(
                method,
                duration_ms = %duration.as_millis(),
                "Telegram call completed"
            ),
            Err(e) if e.is_not_modified() => {}
            Err(e) => tracing::warn!(
                method,
                duration_ms = %duration.as_millis(),
                error = %e,
                "Telegram call failed"
            ),
        }

        result
    }

    /// Updates after `offset`, waiting up to the poll timeout for new ones
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<SentMessage, TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        attach_markup(&mut body, markup);
        self.call("sendMessage", &body).await
    }

    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<SentMessage, TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "photo": photo, "caption": caption });
        attach_markup(&mut body, markup);
        self.call("sendPhoto", &body).await
    }

    pub async fn edit_message_media(
        &self,
        chat_id: i64,
        message_id: i64,
        media: &InputMediaPhoto,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "message_id": message_id, "media": media });
        attach_markup(&mut body, markup);
        self.call::<Value>("editMessageMedia", &body).await.map(|_| ())
    }

    pub async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i64,
        caption: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "message_id": message_id, "caption": caption });
        attach_markup(&mut body, markup);
        self.call::<Value>("editMessageCaption", &body).await.map(|_| ())
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "message_id": message_id, "text": text });
        attach_markup(&mut body, markup);
        self.call::<Value>("editMessageText", &body).await.map(|_| ())
    }

    /// Delete a message the bot sent earlier
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        self.call::<Value>(
            "deleteMessage",
            &json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await
        .map(|_| ())
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "callback_query_id": callback_query_id, "show_alert": show_alert });
        if let (Some(text), Some(object)) = (text, body.as_object_mut()) {
            object.insert("text".into(), text.into());
        }
        self.call::<Value>("answerCallbackQuery", &body).await.map(|_| ())
    }
}

/// Omitting `reply_markup` on an edit removes the existing keyboard
fn attach_markup(body: &mut Value, markup: Option<&InlineKeyboardMarkup>) {
    if let (Some(markup), Some(object)) = (markup, body.as_object_mut()) {
        object.insert("reply_markup".into(), json!(markup));
    }
}
