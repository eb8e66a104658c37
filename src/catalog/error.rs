//! Catalog client error types

use thiserror::Error;

/// Catalog error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CatalogError {
    pub kind: CatalogErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::NotFound, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Rejected, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Decode, message)
    }

    /// Classify an HTTP status returned by Sonarr
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("Sonarr returned {status}: {body}");
        match status.as_u16() {
            401 | 403 => Self::auth(message),
            404 => Self::not_found(message),
            400..=499 => Self::rejected(message),
            _ => Self::network(message),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::decode(e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

/// Error classification for logging and fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// Connection failures, timeouts and 5xx responses
    Network,
    /// API key rejected (401, 403)
    Auth,
    /// Endpoint or record does not exist (404)
    NotFound,
    /// Sonarr refused the request (other 4xx), e.g. series already added
    Rejected,
    /// Response body did not match the expected shape
    Decode,
}
