//! Match Scoring Event Sourcing Module
//!
//! This module provides types for the live scoring system:
//! - Commands: Requests from captains/admins to change a match
//! - Events: Immutable facts recorded after command processing
//! - Snapshots: Computed match state from the event stream
//! - Sync: Realtime updates and reconnection types

pub mod command;
pub mod event;
pub mod snapshot;
pub mod sync;
pub mod types;

// Re-exports
pub use command::{MatchCommand, MatchCommandPayload};
pub use event::{EventPayload, MatchEvent, MatchEventType};
pub use snapshot::{Innings, MatchSnapshot, MatchStatus};
pub use sync::{
    StateUpdate, StreamMessage, SyncRequest, SyncResponse, VersionCheck, VersionTracker,
};
pub use types::*;
