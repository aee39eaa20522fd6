//! # tableside-shared
//!
//! Domain types shared by the transport and client crates: the restaurant
//! record, the per-install client identifier used for echo suppression on
//! the subscription feed, the transport error taxonomy, and protocol
//! constants.

pub mod constants;
pub mod error;
pub mod types;

pub use error::TransportError;
pub use types::{ClientId, Restaurant, RestaurantDraft};
