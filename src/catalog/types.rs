//! Sonarr record types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A series as returned by Sonarr's lookup or library endpoints.
///
/// Fields the bot does not interpret are kept in `extra` so that an add or
/// update can send the record back without dropping anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Library id, absent for lookup results that were never added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub runtime: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_poster: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default, alias = "folder", skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_profile_id: Option<i64>,
    #[serde(default)]
    pub season_folder: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default = "default_monitored")]
    pub monitored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<SeriesStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_monitored() -> bool {
    true
}

impl Series {
    /// Whether the series has already been added to the library
    pub fn in_library(&self) -> bool {
        self.id.is_some_and(|id| id != 0)
    }

    /// Poster URL, preferring `remotePoster` over the image list
    pub fn poster_url(&self) -> Option<&str> {
        self.remote_poster
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.images.first().and_then(|img| img.remote_url.as_deref()))
    }

    /// Folder the series lives in: `folderName` for lookups, the full
    /// `path` for library records
    pub fn folder(&self) -> Option<&str> {
        self.folder_name
            .as_deref()
            .or_else(|| self.extra.get("path").and_then(Value::as_str))
    }

    pub fn season_numbers(&self) -> Vec<i32> {
        self.seasons.iter().map(|s| s.season_number).collect()
    }

    /// True when Sonarr reports fewer files than aired episodes
    pub fn is_missing_episodes(&self) -> bool {
        match &self.statistics {
            Some(stats) => stats.episode_file_count < stats.episode_count,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub cover_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: i32,
    #[serde(default)]
    pub monitored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    #[serde(default)]
    pub episode_file_count: u32,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub id: i64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

/// Entry of the download queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub sizeleft: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeleft: Option<String>,
}

impl QueueItem {
    /// Download progress in whole percent
    pub fn progress_percent(&self) -> u32 {
        if self.size <= 0.0 {
            return 0;
        }
        let done = (self.size - self.sizeleft).max(0.0) / self.size;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (done * 100.0).round().clamp(0.0, 100.0) as u32;
        percent
    }
}

/// Page wrapper used by `GET /queue`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuePage {
    #[serde(default)]
    pub records: Vec<QueueItem>,
}

/// How a submitted series should be monitored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    All,
    None,
}

/// Everything needed to add a series or update a library series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSubmission {
    pub series: Series,
    pub quality_profile_id: i64,
    pub language_profile_id: i64,
    pub root_folder_path: String,
    pub tags: Vec<i64>,
    pub season_folder: bool,
    pub search_for_missing: bool,
    pub monitor: MonitorMode,
}

impl SeriesSubmission {
    pub fn is_update(&self) -> bool {
        self.series.in_library()
    }
}
