//! Social workflows: each operation reads the state it needs, asks `rules` what to do, and
//! issues independent writes against the store.
//!
//! Primary writes propagate store failures with `?`. Secondary effects, notification
//! dispatch and follower fan-out, are caught and logged so they never fail the action that
//! triggered them. Referenced documents that do not exist are treated as a safe default and
//! reported through the return value instead of an error.

pub mod bookmarks;
pub mod chat;
pub mod comments;
pub mod integrity;
pub mod notifications;
pub mod posts;
pub mod profiles;
pub mod social_graph;
