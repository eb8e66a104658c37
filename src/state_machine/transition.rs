//! Pure state transition function
//!
//! Given a session state, the catalog snapshot, an action and the caller's
//! level, compute the next state and the effects the dispatcher must run.
//! Nothing in here performs I/O.

use super::action::{Action, AddMode};
use super::permissions::is_permitted;
use super::state::{AuthLevel, CatalogSnapshot, Menu, NavigationState};
use super::Effect;
use crate::catalog::{MonitorMode, SeriesSubmission};
use thiserror::Error;

pub const CANCELED_CAPTION: &str = "Search canceled!";
pub const NOT_IN_LIBRARY_CAPTION: &str = "This series is not in the library.";
pub const NO_SELECTION_CAPTION: &str = "No series selected.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    /// Next session state, `None` once the session has been cleared
    pub new_state: Option<NavigationState>,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: NavigationState) -> Self {
        Self {
            new_state: Some(state),
            effects: vec![],
        }
    }

    /// Terminal result: the session ends and its record is dropped
    pub fn cleared() -> Self {
        Self {
            new_state: None,
            effects: vec![Effect::ClearSession],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Keep the session, persist it and repaint the menu
    fn updated(state: NavigationState) -> Self {
        Self::new(state)
            .with_effect(Effect::PersistState)
            .with_effect(Effect::repaint())
    }
}

/// Errors that can occur during transition. The session is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("You are missing the permissions for this operation.")]
    MissingPermissions,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &NavigationState,
    snapshot: &CatalogSnapshot,
    action: Action,
    level: AuthLevel,
) -> Result<TransitionResult, TransitionError> {
    let Some(series) = state.current() else {
        return match action {
            Action::Cancel => {
                Ok(TransitionResult::cleared().with_effect(Effect::reply(CANCELED_CAPTION)))
            }
            Action::Add(_) | Action::Remove => {
                Ok(TransitionResult::cleared().with_effect(Effect::reply(NO_SELECTION_CAPTION)))
            }
            Action::Noop => Ok(TransitionResult::new(state.clone())),
            other => Err(TransitionError::InvalidTransition(format!(
                "{} without a selected series",
                other.kind()
            ))),
        };
    };

    if !is_permitted(action.kind(), series.in_library(), level) {
        return Err(TransitionError::MissingPermissions);
    }

    match action {
        // ============================================================
        // Navigation
        // ============================================================
        Action::Goto(Some(index)) if index < state.items.len() => {
            Ok(TransitionResult::new(state.select(index, snapshot))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::redraw()))
        }

        Action::Goto(Some(index)) => Err(TransitionError::InvalidTransition(format!(
            "goto {index} with {} results",
            state.items.len()
        ))),

        Action::Goto(None) => Ok(TransitionResult::updated(state.with_menu(Menu::Main))),

        Action::Noop => Ok(TransitionResult::new(state.clone())),

        // ============================================================
        // Season Search
        // ============================================================
        Action::Seasons => Ok(TransitionResult::updated(state.with_menu(Menu::Seasons))),

        Action::SearchSeason(season) => {
            let series_id = series.id.filter(|_| series.in_library()).ok_or_else(|| {
                TransitionError::InvalidTransition("season search outside the library".into())
            })?;
            if !state.seasons.is_available(season) {
                return Err(TransitionError::InvalidTransition(format!(
                    "season {season} is not available"
                )));
            }
            if state.seasons.is_selected(season) {
                return Ok(TransitionResult::new(state.clone()).with_effect(Effect::repaint()));
            }

            let next = NavigationState {
                seasons: state.seasons.with_selected(season),
                ..state.clone()
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::SearchSeason { series_id, season })
                .with_effect(Effect::PersistState)
                .with_effect(Effect::repaint()))
        }

        // ============================================================
        // Tags
        // ============================================================
        Action::Tags => Ok(TransitionResult::updated(NavigationState {
            tags: Vec::new(),
            menu: Menu::Tags,
            ..state.clone()
        })),

        Action::AddTag(tag) => {
            let mut tags = state.tags.clone();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
            Ok(TransitionResult::updated(NavigationState {
                tags,
                ..state.clone()
            }))
        }

        Action::RemTag(tag) => Ok(TransitionResult::updated(NavigationState {
            tags: state.tags.iter().copied().filter(|t| *t != tag).collect(),
            ..state.clone()
        })),

        // ============================================================
        // Configuration Menus
        // ============================================================
        Action::Path => Ok(TransitionResult::updated(state.with_menu(Menu::Path))),
        Action::Quality => Ok(TransitionResult::updated(state.with_menu(Menu::Quality))),
        Action::Language => Ok(TransitionResult::updated(state.with_menu(Menu::Language))),
        Action::AddMenu => Ok(TransitionResult::updated(state.with_menu(Menu::Add))),

        // Unknown ids select nothing; the add menu then shows "-"
        Action::SelectPath(id) => Ok(TransitionResult::updated(NavigationState {
            root_folder: snapshot.root_folder(id).cloned(),
            menu: Menu::Add,
            ..state.clone()
        })),

        Action::SelectQuality(id) => Ok(TransitionResult::updated(NavigationState {
            quality_profile: snapshot.quality_profile(id).cloned(),
            menu: Menu::Add,
            ..state.clone()
        })),

        Action::SelectLanguage(id) => Ok(TransitionResult::updated(NavigationState {
            language_profile: snapshot.language_profile(id).cloned(),
            menu: Menu::Add,
            ..state.clone()
        })),

        Action::UseSeasonFolder => Ok(TransitionResult::updated(NavigationState {
            use_season_folder: !state.use_season_folder,
            menu: Menu::Add,
            ..state.clone()
        })),

        Action::SelectUseSeasonFolder(value) => Ok(TransitionResult::updated(NavigationState {
            use_season_folder: value,
            menu: Menu::Add,
            ..state.clone()
        })),

        // ============================================================
        // Terminal Actions
        // ============================================================
        Action::Add(mode) => {
            let submission = SeriesSubmission {
                series: series.clone(),
                quality_profile_id: state.quality_profile.as_ref().map_or(0, |p| p.id),
                language_profile_id: state.language_profile.as_ref().map_or(0, |p| p.id),
                root_folder_path: state
                    .root_folder
                    .as_ref()
                    .map(|f| f.path.clone())
                    .unwrap_or_default(),
                tags: state.tags.clone(),
                season_folder: state.use_season_folder,
                search_for_missing: mode == AddMode::Search,
                monitor: if mode == AddMode::NoMonitor {
                    MonitorMode::None
                } else {
                    MonitorMode::All
                },
            };
            Ok(TransitionResult::cleared().with_effect(Effect::submit(submission)))
        }

        Action::Cancel => {
            Ok(TransitionResult::cleared().with_effect(Effect::reply(CANCELED_CAPTION)))
        }

        Action::Remove => match series.id.filter(|_| series.in_library()) {
            Some(series_id) => {
                Ok(TransitionResult::cleared().with_effect(Effect::RemoveSeries { series_id }))
            }
            None => {
                Ok(TransitionResult::cleared().with_effect(Effect::reply(NOT_IN_LIBRARY_CAPTION)))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LanguageProfile, QualityProfile, RootFolder, Season, Series};

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            root_folders: vec![
                RootFolder {
                    id: 1,
                    path: "/tv".to_string(),
                },
                RootFolder {
                    id: 2,
                    path: "/kids".to_string(),
                },
            ],
            quality_profiles: vec![
                QualityProfile {
                    id: 1,
                    name: "Any".to_string(),
                },
                QualityProfile {
                    id: 4,
                    name: "HD-1080p".to_string(),
                },
            ],
            language_profiles: vec![LanguageProfile {
                id: 1,
                name: "English".to_string(),
            }],
            tags: vec![],
        }
    }

    fn show(title: &str, id: Option<i64>, seasons: &[i32]) -> Series {
        Series {
            id,
            title: title.to_string(),
            year: 2020,
            status: "continuing".to_string(),
            seasons: seasons
                .iter()
                .map(|n| Season {
                    season_number: *n,
                    monitored: true,
                })
                .collect(),
            ..Series::default()
        }
    }

    fn two_items() -> NavigationState {
        let first = Series {
            folder_name: Some("/tv/First".to_string()),
            quality_profile_id: Some(1),
            language_profile_id: Some(1),
            tags: vec![1],
            season_folder: false,
            ..show("First", None, &[1])
        };
        let second = Series {
            folder_name: Some("/kids/Second".to_string()),
            quality_profile_id: Some(4),
            language_profile_id: None,
            tags: vec![7, 8],
            season_folder: true,
            ..show("Second", Some(42), &[1, 2, 3])
        };
        NavigationState::new(vec![first, second], &snapshot())
    }

    fn apply(state: &NavigationState, action: Action, level: AuthLevel) -> TransitionResult {
        transition(state, &snapshot(), action, level).unwrap()
    }

    #[test]
    fn test_goto_recomputes_every_derived_field() {
        let mut state = apply(&two_items(), Action::Path, AuthLevel::User).new_state.unwrap();
        state = apply(&state, Action::SelectQuality(4), AuthLevel::User).new_state.unwrap();
        state = apply(&state, Action::UseSeasonFolder, AuthLevel::User).new_state.unwrap();

        let result = apply(&state, Action::Goto(Some(1)), AuthLevel::User);
        let next = result.new_state.unwrap();

        assert_eq!(next.index, 1);
        assert_eq!(next.root_folder.as_ref().map(|f| f.id), Some(2));
        assert_eq!(next.quality_profile.as_ref().map(|p| p.id), Some(4));
        assert_eq!(next.language_profile, None);
        assert_eq!(next.tags, vec![7, 8]);
        assert_eq!(next.seasons.available, vec![1, 2, 3]);
        assert!(next.seasons.selected.is_empty());
        assert!(next.use_season_folder);
        assert_eq!(next.menu, Menu::Main);
        assert!(result.effects.contains(&Effect::redraw()));
    }

    #[test]
    fn test_goto_without_index_only_resets_menu() {
        let state = apply(&two_items(), Action::AddMenu, AuthLevel::User).new_state.unwrap();
        let next = apply(&state, Action::Goto(None), AuthLevel::User).new_state.unwrap();

        assert_eq!(next, state.with_menu(Menu::Main));
    }

    #[test]
    fn test_goto_out_of_range_is_rejected() {
        let result = transition(&two_items(), &snapshot(), Action::Goto(Some(2)), AuthLevel::User);
        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    #[test]
    fn test_use_season_folder_toggles_back() {
        let state = two_items();
        let once = apply(&state, Action::UseSeasonFolder, AuthLevel::User).new_state.unwrap();
        let twice = apply(&once, Action::UseSeasonFolder, AuthLevel::User).new_state.unwrap();

        assert_eq!(once.use_season_folder, !state.use_season_folder);
        assert_eq!(twice.use_season_folder, state.use_season_folder);
        assert_eq!(once.menu, Menu::Add);
        assert_eq!(twice.menu, Menu::Add);
    }

    #[test]
    fn test_search_season_emits_effect_once() {
        let state = apply(&two_items(), Action::Goto(Some(1)), AuthLevel::User).new_state.unwrap();

        let first = apply(&state, Action::SearchSeason(2), AuthLevel::Moderator);
        assert!(first.effects.contains(&Effect::SearchSeason {
            series_id: 42,
            season: 2,
        }));
        let after_first = first.new_state.unwrap();

        let second = apply(&after_first, Action::SearchSeason(2), AuthLevel::Moderator);
        assert!(!second
            .effects
            .iter()
            .any(|e| matches!(e, Effect::SearchSeason { .. })));
        assert_eq!(second.new_state.unwrap().seasons.selected, vec![2]);
    }

    #[test]
    fn test_search_season_rejects_unknown_season() {
        let state = apply(&two_items(), Action::Goto(Some(1)), AuthLevel::User).new_state.unwrap();
        let result = transition(&state, &snapshot(), Action::SearchSeason(9), AuthLevel::Admin);
        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    #[test]
    fn test_library_mutation_needs_moderator() {
        let state = apply(&two_items(), Action::Goto(Some(1)), AuthLevel::User).new_state.unwrap();

        let denied = transition(&state, &snapshot(), Action::SelectPath(1), AuthLevel::User);
        assert_eq!(denied.unwrap_err(), TransitionError::MissingPermissions);

        let allowed = apply(&state, Action::SelectPath(1), AuthLevel::Moderator);
        assert_eq!(allowed.new_state.unwrap().root_folder.map(|f| f.id), Some(1));
    }

    #[test]
    fn test_new_series_configurable_by_users() {
        let next = apply(&two_items(), Action::SelectQuality(4), AuthLevel::User)
            .new_state
            .unwrap();
        assert_eq!(next.quality_profile.map(|p| p.id), Some(4));
        assert_eq!(next.menu, Menu::Add);
    }

    #[test]
    fn test_unknown_selection_falls_back_to_absent() {
        let next = apply(&two_items(), Action::SelectLanguage(77), AuthLevel::User)
            .new_state
            .unwrap();
        assert_eq!(next.language_profile, None);
        assert_eq!(next.menu, Menu::Add);
    }

    #[test]
    fn test_tags_menu_clears_working_set() {
        let state = apply(&two_items(), Action::Tags, AuthLevel::User).new_state.unwrap();
        assert!(state.tags.is_empty());
        assert_eq!(state.menu, Menu::Tags);

        let state = apply(&state, Action::AddTag(3), AuthLevel::User).new_state.unwrap();
        let state = apply(&state, Action::AddTag(3), AuthLevel::User).new_state.unwrap();
        assert_eq!(state.tags, vec![3]);

        let state = apply(&state, Action::RemTag(3), AuthLevel::User).new_state.unwrap();
        assert!(state.tags.is_empty());
    }

    #[test]
    fn test_add_builds_submission_and_clears() {
        let state = two_items();
        let result = apply(&state, Action::Add(AddMode::NoMonitor), AuthLevel::User);

        assert!(result.new_state.is_none());
        assert!(result.effects.contains(&Effect::ClearSession));
        let submission = result
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::SubmitSeries(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(submission.series.title, "First");
        assert_eq!(submission.quality_profile_id, 1);
        assert_eq!(submission.root_folder_path, "/tv");
        assert_eq!(submission.monitor, MonitorMode::None);
        assert!(!submission.search_for_missing);
        assert!(!submission.is_update());
    }

    #[test]
    fn test_add_without_selections_uses_placeholders() {
        let state =
            NavigationState::new(vec![show("Bare", None, &[])], &CatalogSnapshot::default());
        let result = transition(
            &state,
            &CatalogSnapshot::default(),
            Action::Add(AddMode::Search),
            AuthLevel::User,
        )
        .unwrap();

        let Some(Effect::SubmitSeries(submission)) = result
            .effects
            .iter()
            .find(|e| matches!(e, Effect::SubmitSeries(_)))
        else {
            panic!("no submission");
        };
        assert_eq!(submission.quality_profile_id, 0);
        assert_eq!(submission.language_profile_id, 0);
        assert_eq!(submission.root_folder_path, "");
        assert!(submission.search_for_missing);
    }

    #[test]
    fn test_remove_requires_library_id() {
        let library = apply(&two_items(), Action::Goto(Some(1)), AuthLevel::User)
            .new_state
            .unwrap();
        let result = apply(&library, Action::Remove, AuthLevel::User);
        assert!(result.new_state.is_none());
        assert!(result.effects.contains(&Effect::RemoveSeries { series_id: 42 }));

        let result = apply(&two_items(), Action::Remove, AuthLevel::User);
        assert!(result.new_state.is_none());
        assert!(result.effects.contains(&Effect::reply(NOT_IN_LIBRARY_CAPTION)));
    }

    #[test]
    fn test_cancel_clears_from_any_menu() {
        let state = apply(&two_items(), Action::Quality, AuthLevel::User).new_state.unwrap();
        let result = apply(&state, Action::Cancel, AuthLevel::User);
        assert!(result.new_state.is_none());
        assert_eq!(
            result.effects,
            vec![Effect::ClearSession, Effect::reply(CANCELED_CAPTION)]
        );
    }

    #[test]
    fn test_empty_results_only_accept_terminal_actions() {
        let empty = NavigationState::default();
        assert!(transition(&empty, &snapshot(), Action::Goto(Some(0)), AuthLevel::User).is_err());
        assert!(transition(&empty, &snapshot(), Action::Cancel, AuthLevel::User)
            .unwrap()
            .new_state
            .is_none());
    }
}
