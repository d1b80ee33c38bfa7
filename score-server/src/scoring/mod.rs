//! Match Scoring Event Sourcing Module
//!
//! Live cricket scoring built on an append-only per-match event log:
//!
//! - **overs**: pure over-accounting engine (one delivery → new innings totals)
//! - **rights** / **lifecycle**: guards for the scoring-rights FSM and match status
//! - **actions**: command handlers producing events
//! - **appliers**: event handlers folding events into snapshots
//! - **manager**: MatchesManager, the serialized command pipeline
//! - **storage**: redb persistence for events, snapshots and delivery logs
//! - **broadcast**: per-match realtime fan-out
//! - **sync**: reconnection catch-up
//! - **expiry**: background cancellation of stale rights requests
//!
//! # Architecture
//!
//! ```text
//! Command → MatchesManager ─(match lock)─→ Action → Events → Storage (redb)
//!                 ↓                                   ↓
//!          MatchBroadcaster                   Snapshot Update
//!                 ↓
//!       Subscribers of that match
//! ```
//!
//! # Data Flow
//!
//! 1. Client sends a MatchCommand (HTTP)
//! 2. MatchesManager takes the match lock and validates the command
//! 3. MatchEvents are generated with the next per-match versions
//! 4. Events, snapshot and delivery log are persisted in one redb transaction
//! 5. A StateUpdate is published to the match's subscribers
//! 6. CommandResponse is returned to the client

// traits 必须先声明: enum_dispatch 需要先看到 EventApplier
pub mod traits;

pub mod actions;
pub mod appliers;
pub mod broadcast;
pub mod expiry;
pub mod lifecycle;
pub mod manager;
pub mod overs;
pub mod policy;
pub mod rights;
pub mod storage;
pub mod sync;

// Re-exports
pub use broadcast::{MatchBroadcaster, MatchSubscription, SubscriptionItem};
pub use expiry::RightsExpiryWorker;
pub use manager::{ManagerError, ManagerResult, MatchesManager};
pub use policy::{ScorerPolicy, ScoringRules};
pub use storage::MatchStorage;
pub use sync::SyncService;

// Re-export shared types for convenience
pub use shared::scoring::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, MatchCommand,
    MatchCommandPayload, MatchEvent, MatchEventType, MatchSnapshot, MatchStatus, StateUpdate,
    StreamMessage, SyncRequest, SyncResponse,
};
