//! Core navigation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the dispatcher feeds an [`Action`] into [`transition`] and executes the
//! returned [`Effect`]s.

pub mod action;
mod effect;
pub mod permissions;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use action::{Action, AddMode};
pub use effect::Effect;
pub use state::{AuthLevel, CatalogSnapshot, Menu, NavigationState};
pub use transition::{transition, TransitionError};
