//! Media catalog access
//!
//! Typed records and an HTTP client for the Sonarr v3 API.

mod error;
mod sonarr;
mod types;

pub use error::{CatalogError, CatalogErrorKind};
pub use sonarr::SonarrClient;
pub use types::*;
