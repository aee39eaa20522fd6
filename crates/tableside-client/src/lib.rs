//! # tableside-client
//!
//! Client-side core of the restaurant directory: the list store, the
//! session loop that applies transitions one at a time in dispatch order,
//! and the presentation-facing [`Session`] handle.
//!
//! The UI is an external collaborator: it renders snapshots observed via
//! [`Session::subscribe`] and calls the intent methods. Nothing in this
//! crate draws anything.

mod bridge;
pub mod session;
pub mod state;

pub use session::Session;
pub use state::{Action, DraftField, ListState};
