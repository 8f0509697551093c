//! Snapgram social rules layer.
//!
//! Follow graph with privacy gating, notification dispatch gated by per-user settings, like
//! counters, bookmarks, and chat unread bookkeeping, all issued as plain document writes
//! against a [`store::DocumentStore`] backend.

pub mod client;
pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod models;
pub mod rules;
pub mod serde_helpers;
pub mod session;
pub mod store;
pub mod validators;
pub mod workflows;

pub use client::{Client, CollectionHandle, Subscription};
pub use config::Settings;
pub use errors::*;
pub use models::*;
pub use session::Session;
pub use store::{DocumentStore, FieldOp, Filter, MemoryStore, RedisStore};

pub use redis;
