//! Capability table for navigation actions
//!
//! Any authorized user may browse and add new series. Changing the
//! configuration of a series that is already in the library needs a
//! moderator.

use super::action::ActionKind;
use super::state::AuthLevel;

/// Actions that mutate a library series and therefore need [`AuthLevel::Moderator`]
pub const LIBRARY_MUTATIONS: &[ActionKind] = &[
    ActionKind::AddTag,
    ActionKind::RemTag,
    ActionKind::SelectPath,
    ActionKind::SelectQuality,
    ActionKind::SelectLanguage,
    ActionKind::SearchSeason,
    ActionKind::SelectUseSeasonFolder,
];

/// Minimum level required to run `kind` against a series
pub fn required_level(kind: ActionKind, in_library: bool) -> AuthLevel {
    if in_library && LIBRARY_MUTATIONS.contains(&kind) {
        AuthLevel::Moderator
    } else {
        AuthLevel::User
    }
}

pub fn is_permitted(kind: ActionKind, in_library: bool, level: AuthLevel) -> bool {
    level >= required_level(kind, in_library)
}
