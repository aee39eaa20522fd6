//! # tableside-api
//!
//! Transport layer for the hosted GraphQL backend: the three operation
//! documents and their JSON envelopes, a reqwest-backed client for the
//! one-shot query/mutation calls, and a channel-based subscription feed
//! for the creation stream.
//!
//! Everything the backend does (query execution, conflict resolution,
//! persistence, fan-out) is opaque to this crate; it only moves records
//! across the wire.

pub mod client;
pub mod config;
pub mod graphql;
pub mod subscription;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use subscription::{spawn_feed, FeedEvent, FeedHandle};
