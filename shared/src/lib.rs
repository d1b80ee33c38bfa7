//! Shared types for the live scoring service
//!
//! Wire types used by the score server and by its clients: commands,
//! events, snapshots and realtime sync messages.

pub mod scoring;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
