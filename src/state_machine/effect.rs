//! Effects produced by state transitions

use crate::catalog::SeriesSubmission;

/// Effects to be executed by the dispatcher after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist the new state under the session key
    PersistState,

    /// Drop the session record
    ClearSession,

    /// Re-render the menu message; `full_redraw` also resends the poster
    Repaint { full_redraw: bool },

    /// Ask the catalog to search one season of a library series (fire-and-forget)
    SearchSeason { series_id: i64, season: i32 },

    /// Add a new series, or update a library series
    SubmitSeries(Box<SeriesSubmission>),

    /// Delete a series from the library
    RemoveSeries { series_id: i64 },

    /// Replace the menu message with a plain caption
    Reply { caption: String },
}

impl Effect {
    pub fn repaint() -> Self {
        Effect::Repaint { full_redraw: false }
    }

    pub fn redraw() -> Self {
        Effect::Repaint { full_redraw: true }
    }

    pub fn reply(caption: impl Into<String>) -> Self {
        Effect::Reply {
            caption: caption.into(),
        }
    }

    pub fn submit(submission: SeriesSubmission) -> Self {
        Effect::SubmitSeries(Box::new(submission))
    }
}
