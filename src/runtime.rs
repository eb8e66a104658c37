//! Runtime for driving chat sessions
//!
//! The [`Dispatcher`] turns chat updates into state-machine actions, runs the
//! resulting effects against the catalog, the session store and the chat
//! transport, and long-polls for more updates until cancelled.

mod dispatcher;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use dispatcher::Dispatcher;
pub use traits::*;

/// Type alias for the production dispatcher with concrete implementations
pub type ProductionDispatcher =
    Dispatcher<crate::catalog::SonarrClient, DatabaseStorage, TelegramTransport>;
