//! Navigation state types

use crate::catalog::{LanguageProfile, QualityProfile, RootFolder, Series, Tag};
use serde::{Deserialize, Serialize};

// ============================================================================
// Permission Levels
// ============================================================================

/// Authorization tier of a chat user, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthLevel {
    User = 1,
    Moderator = 2,
    Admin = 3,
}

impl AuthLevel {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::User),
            2 => Some(Self::Moderator),
            3 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether this level may mutate series that are already in the library
    pub fn can_edit(self) -> bool {
        self >= Self::Moderator
    }
}

// ============================================================================
// Menus
// ============================================================================

/// The sub-menu currently shown under a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Menu {
    /// Top level: navigation between results
    #[default]
    Main,
    Path,
    Tags,
    Quality,
    Language,
    UseSeasonFolder,
    Add,
    Seasons,
}

impl Menu {
    /// Where the Back button leads from this menu, `None` at the top level
    pub fn parent(self) -> Option<Menu> {
        match self {
            Menu::Main => None,
            Menu::Seasons | Menu::Add => Some(Menu::Main),
            Menu::Path
            | Menu::Tags
            | Menu::Quality
            | Menu::Language
            | Menu::UseSeasonFolder => Some(Menu::Add),
        }
    }
}

// ============================================================================
// Season Selection
// ============================================================================

/// Seasons of the current series and the ones searched during this session.
///
/// `selected` is always a subset of `available`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeasonState {
    pub available: Vec<i32>,
    #[serde(default)]
    pub selected: Vec<i32>,
}

impl SeasonState {
    pub fn for_series(series: &Series) -> Self {
        Self {
            available: series.season_numbers(),
            selected: Vec::new(),
        }
    }

    pub fn is_available(&self, season: i32) -> bool {
        self.available.contains(&season)
    }

    pub fn is_selected(&self, season: i32) -> bool {
        self.selected.contains(&season)
    }

    /// Copy with `season` marked as selected; no-op if already selected or unavailable
    #[must_use]
    pub fn with_selected(&self, season: i32) -> Self {
        let mut next = self.clone();
        if self.is_available(season) && !self.is_selected(season) {
            next.selected.push(season);
        }
        next
    }
}

// ============================================================================
// Catalog Snapshot
// ============================================================================

/// Configuration options fetched from the catalog (immutable during a transition)
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub root_folders: Vec<RootFolder>,
    pub quality_profiles: Vec<QualityProfile>,
    pub language_profiles: Vec<LanguageProfile>,
    pub tags: Vec<Tag>,
}

impl CatalogSnapshot {
    pub fn root_folder(&self, id: i64) -> Option<&RootFolder> {
        self.root_folders.iter().find(|f| f.id == id)
    }

    pub fn quality_profile(&self, id: i64) -> Option<&QualityProfile> {
        self.quality_profiles.iter().find(|p| p.id == id)
    }

    pub fn language_profile(&self, id: i64) -> Option<&LanguageProfile> {
        self.language_profiles.iter().find(|p| p.id == id)
    }

    /// First root folder whose path prefixes the series' folder
    pub fn root_folder_for(&self, series: &Series) -> Option<&RootFolder> {
        let folder = series.folder()?;
        self.root_folders
            .iter()
            .find(|f| folder.starts_with(f.path.as_str()))
    }

    pub fn quality_profile_for(&self, series: &Series) -> Option<&QualityProfile> {
        series
            .quality_profile_id
            .and_then(|id| self.quality_profile(id))
    }

    pub fn language_profile_for(&self, series: &Series) -> Option<&LanguageProfile> {
        series
            .language_profile_id
            .and_then(|id| self.language_profile(id))
    }
}

// ============================================================================
// Navigation State
// ============================================================================

/// Per-message session state: the result list, the cursor and the
/// configuration selected for the series under the cursor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationState {
    pub items: Vec<Series>,
    pub index: usize,
    pub quality_profile: Option<QualityProfile>,
    pub language_profile: Option<LanguageProfile>,
    pub root_folder: Option<RootFolder>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub use_season_folder: bool,
    #[serde(default)]
    pub seasons: SeasonState,
    #[serde(default)]
    pub menu: Menu,
}

impl NavigationState {
    /// Fresh state for a list of search or library results, cursor on the first one
    pub fn new(items: Vec<Series>, snapshot: &CatalogSnapshot) -> Self {
        let state = Self {
            items,
            ..Self::default()
        };
        if state.items.is_empty() {
            state
        } else {
            state.select(0, snapshot)
        }
    }

    /// Series under the cursor
    pub fn current(&self) -> Option<&Series> {
        self.items.get(self.index)
    }

    /// Whether the series under the cursor is already in the library
    pub fn in_library(&self) -> bool {
        self.current().is_some_and(Series::in_library)
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    /// Move the cursor and derive every per-series field from the new item.
    ///
    /// Callers must ensure `index < items.len()`.
    #[must_use]
    pub fn select(&self, index: usize, snapshot: &CatalogSnapshot) -> Self {
        let series = &self.items[index];
        Self {
            items: self.items.clone(),
            index,
            quality_profile: snapshot.quality_profile_for(series).cloned(),
            language_profile: snapshot.language_profile_for(series).cloned(),
            root_folder: snapshot.root_folder_for(series).cloned(),
            tags: series.tags.clone(),
            use_season_folder: series.season_folder,
            seasons: SeasonState::for_series(series),
            menu: Menu::Main,
        }
    }

    #[must_use]
    pub fn with_menu(&self, menu: Menu) -> Self {
        Self {
            menu,
            ..self.clone()
        }
    }
}
