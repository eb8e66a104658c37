//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::permissions::LIBRARY_MUTATIONS;
use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{LanguageProfile, QualityProfile, RootFolder, Season, Series, Tag};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        root_folders: vec![
            RootFolder {
                id: 1,
                path: "/tv".to_string(),
            },
            RootFolder {
                id: 2,
                path: "/anime".to_string(),
            },
        ],
        quality_profiles: vec![
            QualityProfile {
                id: 1,
                name: "Any".to_string(),
            },
            QualityProfile {
                id: 2,
                name: "SD".to_string(),
            },
            QualityProfile {
                id: 3,
                name: "HD-1080p".to_string(),
            },
        ],
        language_profiles: vec![
            LanguageProfile {
                id: 1,
                name: "English".to_string(),
            },
            LanguageProfile {
                id: 2,
                name: "Japanese".to_string(),
            },
        ],
        tags: vec![
            Tag {
                id: 1,
                label: "kids".to_string(),
            },
            Tag {
                id: 2,
                label: "4k".to_string(),
            },
        ],
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_series() -> impl Strategy<Value = Series> {
    (
        proptest::option::of(1i64..1000),
        "[A-Z][a-z]{2,8}",
        proptest::collection::btree_set(0i32..8, 0..5),
        prop_oneof![Just("/tv"), Just("/anime"), Just("/elsewhere")],
        proptest::option::of(0i64..5),
        proptest::option::of(0i64..4),
        proptest::collection::vec(0i64..4, 0..3),
        any::<bool>(),
    )
        .prop_map(
            |(id, title, seasons, root, quality, language, tags, season_folder)| Series {
                id,
                folder_name: Some(format!("{root}/{title}")),
                title,
                year: 2020,
                status: "continuing".to_string(),
                seasons: seasons
                    .into_iter()
                    .map(|n| Season {
                        season_number: n,
                        monitored: true,
                    })
                    .collect(),
                quality_profile_id: quality,
                language_profile_id: language,
                tags,
                season_folder,
                ..Series::default()
            },
        )
}

fn arb_items() -> impl Strategy<Value = Vec<Series>> {
    proptest::collection::vec(arb_series(), 1..5)
}

fn arb_menu() -> impl Strategy<Value = Menu> {
    prop_oneof![
        Just(Menu::Main),
        Just(Menu::Path),
        Just(Menu::Tags),
        Just(Menu::Quality),
        Just(Menu::Language),
        Just(Menu::UseSeasonFolder),
        Just(Menu::Add),
        Just(Menu::Seasons),
    ]
}

/// A state positioned on an arbitrary result with an arbitrary menu open
fn arb_state() -> impl Strategy<Value = NavigationState> {
    arb_items()
        .prop_flat_map(|items| {
            let len = items.len();
            (Just(items), 0..len, arb_menu())
        })
        .prop_map(|(items, index, menu)| {
            let snapshot = test_snapshot();
            NavigationState::new(items, &snapshot)
                .select(index, &snapshot)
                .with_menu(menu)
        })
}

fn arb_level() -> impl Strategy<Value = AuthLevel> {
    prop_oneof![
        Just(AuthLevel::User),
        Just(AuthLevel::Moderator),
        Just(AuthLevel::Admin),
    ]
}

fn arb_add_mode() -> impl Strategy<Value = AddMode> {
    prop_oneof![
        Just(AddMode::Search),
        Just(AddMode::NoSearch),
        Just(AddMode::NoMonitor),
    ]
}

fn arb_non_terminal_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        proptest::option::of(0usize..6).prop_map(Action::Goto),
        Just(Action::Seasons),
        (0i32..8).prop_map(Action::SearchSeason),
        Just(Action::Tags),
        (0i64..4).prop_map(Action::AddTag),
        (0i64..4).prop_map(Action::RemTag),
        Just(Action::Path),
        (0i64..4).prop_map(Action::SelectPath),
        Just(Action::Quality),
        (0i64..5).prop_map(Action::SelectQuality),
        Just(Action::Language),
        (0i64..4).prop_map(Action::SelectLanguage),
        Just(Action::AddMenu),
        Just(Action::UseSeasonFolder),
        any::<bool>().prop_map(Action::SelectUseSeasonFolder),
        Just(Action::Noop),
    ]
}

fn arb_terminal_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        arb_add_mode().prop_map(Action::Add),
        Just(Action::Cancel),
        Just(Action::Remove),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => arb_non_terminal_action(),
        1 => arb_terminal_action(),
    ]
}

/// Gated action with an argument that would otherwise succeed
fn arb_library_mutation() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0i64..4).prop_map(Action::AddTag),
        (0i64..4).prop_map(Action::RemTag),
        (0i64..4).prop_map(Action::SelectPath),
        (0i64..5).prop_map(Action::SelectQuality),
        (0i64..4).prop_map(Action::SelectLanguage),
        (0i32..8).prop_map(Action::SearchSeason),
        any::<bool>().prop_map(Action::SelectUseSeasonFolder),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_valid_state(state: &NavigationState) -> bool {
    let index_in_bounds = state.items.is_empty() || state.index < state.items.len();
    let selected_subset = state
        .seasons
        .selected
        .iter()
        .all(|s| state.seasons.available.contains(s));
    let mut selected = state.seasons.selected.clone();
    selected.sort_unstable();
    selected.dedup();
    index_in_bounds && selected_subset && selected.len() == state.seasons.selected.len()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state after any sequence of transitions
    #[test]
    fn prop_transitions_preserve_validity(
        items in arb_items(),
        actions in proptest::collection::vec(arb_action(), 0..25),
        level in arb_level()
    ) {
        let snapshot = test_snapshot();
        let mut state = NavigationState::new(items, &snapshot);

        for action in actions {
            match transition(&state, &snapshot, action, level) {
                Ok(result) => match result.new_state {
                    Some(next) => {
                        prop_assert!(
                            is_valid_state(&next),
                            "Invalid state after {:?}: {:?}",
                            action,
                            next
                        );
                        state = next;
                    }
                    None => break,
                },
                Err(_) => { /* Rejected actions leave the state as it was */ }
            }
        }
    }

    // Invariant 2: goto(idx) derives every per-series field from items[idx]
    #[test]
    fn prop_goto_replaces_derived_fields(state in arb_state(), target in 0usize..5) {
        let snapshot = test_snapshot();
        prop_assume!(target < state.items.len());

        let next = transition(&state, &snapshot, Action::Goto(Some(target)), AuthLevel::User)
            .unwrap()
            .new_state
            .unwrap();
        let series = &state.items[target];

        prop_assert_eq!(next.index, target);
        prop_assert_eq!(next.root_folder, snapshot.root_folder_for(series).cloned());
        prop_assert_eq!(next.quality_profile, snapshot.quality_profile_for(series).cloned());
        prop_assert_eq!(next.language_profile, snapshot.language_profile_for(series).cloned());
        prop_assert_eq!(&next.tags, &series.tags);
        prop_assert_eq!(next.use_season_folder, series.season_folder);
        prop_assert_eq!(next.seasons.available, series.season_numbers());
        prop_assert!(next.seasons.selected.is_empty());
        prop_assert_eq!(next.menu, Menu::Main);
    }

    // Invariant 3: searchseason is idempotent on the selected set
    #[test]
    fn prop_search_season_idempotent(state in arb_state(), season in 0i32..8) {
        let snapshot = test_snapshot();
        let search = Action::SearchSeason(season);
        if let Ok(once) = transition(&state, &snapshot, search, AuthLevel::Admin) {
            let once = once.new_state.unwrap();
            let twice = transition(&once, &snapshot, Action::SearchSeason(season), AuthLevel::Admin)
                .unwrap()
                .new_state
                .unwrap();
            prop_assert_eq!(once.seasons.selected, twice.seasons.selected);
        }
    }

    // Invariant 4: sub-moderators cannot mutate library series
    #[test]
    fn prop_library_mutation_denied_for_users(
        state in arb_state(),
        action in arb_library_mutation()
    ) {
        prop_assume!(state.in_library());
        prop_assert!(LIBRARY_MUTATIONS.contains(&action.kind()));

        let before = serde_json::to_vec(&state).unwrap();
        let result = transition(&state, &test_snapshot(), action, AuthLevel::User);

        prop_assert_eq!(result.unwrap_err(), TransitionError::MissingPermissions);
        prop_assert_eq!(serde_json::to_vec(&state).unwrap(), before);
    }

    // Invariant 5: terminal actions always clear the session
    #[test]
    fn prop_terminal_actions_clear_session(
        state in arb_state(),
        action in arb_terminal_action(),
        level in arb_level()
    ) {
        let result = transition(&state, &test_snapshot(), action, level).unwrap();
        prop_assert!(result.new_state.is_none());
        prop_assert!(result.effects.contains(&Effect::ClearSession));
    }

    // Invariant 6: PersistState effect always emitted on state change
    #[test]
    fn prop_state_changes_persist(
        state in arb_state(),
        action in arb_non_terminal_action(),
        level in arb_level()
    ) {
        if let Ok(result) = transition(&state, &test_snapshot(), action, level) {
            let next = result.new_state.unwrap();
            if next != state {
                prop_assert!(
                    result.effects.contains(&Effect::PersistState),
                    "State changed but no PersistState effect: {:?}",
                    action
                );
            }
        }
    }

    // Invariant 7: session state survives external persistence
    #[test]
    fn prop_state_survives_json(state in arb_state()) {
        let json = serde_json::to_string(&state).unwrap();
        let back: NavigationState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, state);
    }
}
