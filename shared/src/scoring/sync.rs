//! Realtime propagation types
//!
//! - [`StateUpdate`]: one accepted command, as pushed to every observer
//! - [`SyncRequest`] / [`SyncResponse`]: reconnection catch-up
//! - [`VersionTracker`]: client-side stale/duplicate/gap detection

use super::event::MatchEvent;
use super::snapshot::MatchSnapshot;
use serde::{Deserialize, Serialize};

/// Pushed to subscribers once per accepted command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateUpdate {
    pub match_id: String,
    /// Match version after the command (equals `snapshot.version`)
    pub version: u64,
    pub command_id: String,
    /// Events produced by the command, in version order
    pub events: Vec<MatchEvent>,
    /// Authoritative state after the command
    pub snapshot: MatchSnapshot,
}

impl StateUpdate {
    /// Version of the first event in this update (the one a tracker expects next)
    pub fn first_version(&self) -> u64 {
        self.events
            .first()
            .map(|e| e.version)
            .unwrap_or(self.version)
    }
}

/// Messages on a subscriber stream (WebSocket framing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamMessage {
    /// Initial authoritative state
    Snapshot { snapshot: MatchSnapshot },
    Update { update: StateUpdate },
    /// Subscriber fell behind; fetch `/sync` and continue from there
    Resync { last_version: u64 },
}

/// Sync request for reconnection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub match_id: String,
    /// Client's last known version
    pub since_version: u64,
}

/// Sync response for reconnection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub match_id: String,
    /// Events after `since_version` (empty on full sync)
    pub events: Vec<MatchEvent>,
    /// Current snapshot (always present so the client can verify its checksum)
    pub snapshot: MatchSnapshot,
    pub server_version: u64,
    /// Whether the client must replace its state with `snapshot`
    pub requires_full_sync: bool,
    /// Server instance epoch (UUID generated on startup)
    pub server_epoch: String,
}

impl SyncResponse {
    /// Client must replace its state with the snapshot
    pub fn full_sync(snapshot: MatchSnapshot, epoch: String) -> Self {
        Self {
            match_id: snapshot.match_id.clone(),
            events: vec![],
            server_version: snapshot.version,
            snapshot,
            requires_full_sync: true,
            server_epoch: epoch,
        }
    }

    /// Client applies `events` on top of the state it already has
    pub fn incremental(events: Vec<MatchEvent>, snapshot: MatchSnapshot, epoch: String) -> Self {
        Self {
            match_id: snapshot.match_id.clone(),
            events,
            server_version: snapshot.version,
            snapshot,
            requires_full_sync: false,
            server_epoch: epoch,
        }
    }
}

/// Outcome of observing a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    /// Next in sequence: apply it
    Apply,
    /// Already seen (duplicate delivery or replayed message): discard
    Stale,
    /// One or more updates were missed: request a resync
    Gap { expected: u64, received: u64 },
}

/// Client-side version bookkeeping
///
/// Feed it `(first_version, last_version)` of each update in arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionTracker {
    last_version: u64,
}

impl VersionTracker {
    pub fn new(last_version: u64) -> Self {
        Self { last_version }
    }

    pub fn last_version(&self) -> u64 {
        self.last_version
    }

    /// Classify an update spanning `first..=last` versions
    pub fn observe(&mut self, first: u64, last: u64) -> VersionCheck {
        if last <= self.last_version {
            return VersionCheck::Stale;
        }
        let expected = self.last_version + 1;
        if first > expected {
            return VersionCheck::Gap {
                expected,
                received: first,
            };
        }
        self.last_version = last;
        VersionCheck::Apply
    }

    pub fn observe_update(&mut self, update: &StateUpdate) -> VersionCheck {
        self.observe(update.first_version(), update.version)
    }

    /// Jump to a version obtained via resync
    pub fn reset(&mut self, version: u64) {
        self.last_version = version;
    }
}
