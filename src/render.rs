//! Menu rendering
//!
//! Turns a [`NavigationState`] into the caption, optional poster and button
//! grid that the chat transport displays. Everything here is a pure function
//! of its inputs.

mod caption;
mod keyboard;

pub use caption::{
    caption, queue_caption, submit_outcome_caption, FAILURE_CAPTION, REMOVED_CAPTION,
};
pub use keyboard::keyboard;

use crate::state_machine::{Action, CatalogSnapshot, NavigationState};

pub const NO_RESULTS_CAPTION: &str = "No series found";

/// What a button does when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    /// Sends the action back as callback data
    Callback(Action),
    /// Opens an external link
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

impl Button {
    pub fn action(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Callback(action),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Url(url.into()),
        }
    }

    /// Inert button used for headers and indicators
    pub fn label(label: impl Into<String>) -> Self {
        Self::action(label, Action::Noop)
    }

    /// Inert filler that keeps Prev/Next in place when there is no neighbour
    pub fn placeholder() -> Self {
        Self::label(" ")
    }

    pub fn callback_action(&self) -> Option<Action> {
        match &self.kind {
            ButtonKind::Callback(action) => Some(*action),
            ButtonKind::Url(_) => None,
        }
    }
}

/// Button grid split by purpose
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub navigation: Vec<Button>,
    pub menu: Vec<Vec<Button>>,
    pub actions: Vec<Vec<Button>>,
}

impl Keyboard {
    /// All rows in display order, skipping empty ones
    pub fn rows(&self) -> Vec<Vec<Button>> {
        std::iter::once(self.navigation.clone())
            .chain(self.menu.iter().cloned())
            .chain(self.actions.iter().cloned())
            .filter(|row| !row.is_empty())
            .collect()
    }

    /// Every button, in display order
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.navigation
            .iter()
            .chain(self.menu.iter().flatten())
            .chain(self.actions.iter().flatten())
    }

    pub fn find(&self, label: &str) -> Option<&Button> {
        self.buttons().find(|b| b.label == label)
    }
}

/// Message to display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    pub caption: String,
    pub photo: Option<String>,
    pub keyboard: Option<Keyboard>,
}

impl Payload {
    /// Caption-only message without buttons
    pub fn text(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            photo: None,
            keyboard: None,
        }
    }
}

/// Render the full message for a session.
///
/// The poster is only attached on a full redraw; same-item transitions
/// update caption and buttons only.
pub fn render(
    state: &NavigationState,
    snapshot: &CatalogSnapshot,
    allow_edit: bool,
    full_redraw: bool,
) -> Payload {
    let Some(series) = state.current() else {
        return Payload::text(NO_RESULTS_CAPTION);
    };

    Payload {
        caption: caption(series),
        photo: if full_redraw {
            series.poster_url().map(str::to_string)
        } else {
            None
        },
        keyboard: Some(keyboard(state, snapshot, allow_edit)),
    }
}
