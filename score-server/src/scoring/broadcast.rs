//! MatchBroadcaster — per-match fan-out of accepted state
//!
//! ```text
//! MatchesManager (under match lock)
//!       │ StateUpdate
//!       ▼
//! MatchBroadcaster
//!   └── channels: match_id → broadcast::Sender<StateUpdate>
//!         │
//!         ▼
//!   MatchSubscription (version filter → Update / Resync / Closed)
//! ```
//!
//! Channels are created on first subscribe and dropped once the match is
//! terminal, which closes every receiver after the final update.

use dashmap::DashMap;
use shared::scoring::{MatchSnapshot, StateUpdate, VersionCheck, VersionTracker};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default per-match buffer
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Per-match broadcast registry
#[derive(Clone)]
pub struct MatchBroadcaster {
    capacity: usize,
    channels: Arc<DashMap<String, broadcast::Sender<StateUpdate>>>,
}

impl std::fmt::Debug for MatchBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchBroadcaster")
            .field("capacity", &self.capacity)
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl Default for MatchBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl MatchBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Attach a receiver to the match channel, creating it if needed
    ///
    /// Callers must hold the match lock so the receiver lines up with the
    /// snapshot they just read.
    pub fn attach(&self, match_id: &str) -> broadcast::Receiver<StateUpdate> {
        self.channels
            .entry(match_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish one accepted command; returns the number of receivers reached
    ///
    /// A match nobody watches has no channel, so this is a no-op.
    pub fn publish(&self, update: StateUpdate) -> usize {
        let Some(tx) = self.channels.get(&update.match_id) else {
            return 0;
        };
        let version = update.version;
        match tx.send(update) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(match_id = %tx.key(), version, "No active subscribers");
                0
            }
        }
    }

    /// Drop the match channel (terminal state); open receivers see `Closed`
    pub fn close(&self, match_id: &str) {
        if self.channels.remove(match_id).is_some() {
            tracing::debug!(match_id = %match_id, "Broadcast channel closed");
        }
    }

    /// Drop channels whose subscribers have all gone away
    pub fn prune_idle(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        before - self.channels.len()
    }

    pub fn subscriber_count(&self, match_id: &str) -> usize {
        self.channels
            .get(match_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

/// What a subscriber sees next
#[derive(Debug, Clone)]
pub enum SubscriptionItem {
    Update(StateUpdate),
    /// Updates were dropped; fetch a fresh snapshot and call `resynced`
    Resync { last_version: u64 },
    /// Match finished (or server shutting down); no further updates
    Closed,
}

/// One observer of one match
///
/// Starts from the snapshot taken when it attached; every update it yields
/// has a version strictly greater than the previous one.
pub struct MatchSubscription {
    snapshot: MatchSnapshot,
    rx: broadcast::Receiver<StateUpdate>,
    tracker: VersionTracker,
}

impl MatchSubscription {
    pub fn new(snapshot: MatchSnapshot, rx: broadcast::Receiver<StateUpdate>) -> Self {
        let tracker = VersionTracker::new(snapshot.version);
        Self {
            snapshot,
            rx,
            tracker,
        }
    }

    /// Subscription on a match that will never change again
    pub fn finished(snapshot: MatchSnapshot) -> Self {
        let (tx, rx) = broadcast::channel(1);
        drop(tx);
        Self::new(snapshot, rx)
    }

    pub fn match_id(&self) -> &str {
        &self.snapshot.match_id
    }

    /// State at attach time
    pub fn initial_snapshot(&self) -> &MatchSnapshot {
        &self.snapshot
    }

    pub fn last_version(&self) -> u64 {
        self.tracker.last_version()
    }

    /// Continue from a snapshot obtained after a `Resync`
    pub fn resynced(&mut self, version: u64) {
        self.tracker.reset(version);
    }

    /// Wait for the next in-order update
    pub async fn next(&mut self) -> SubscriptionItem {
        loop {
            match self.rx.recv().await {
                Ok(update) => match self.tracker.observe_update(&update) {
                    VersionCheck::Apply => return SubscriptionItem::Update(update),
                    VersionCheck::Stale => continue,
                    VersionCheck::Gap { expected, received } => {
                        tracing::warn!(
                            match_id = %self.snapshot.match_id,
                            expected,
                            received,
                            "Version gap on subscription"
                        );
                        return SubscriptionItem::Resync {
                            last_version: self.tracker.last_version(),
                        };
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        match_id = %self.snapshot.match_id,
                        skipped,
                        "Subscriber lagged"
                    );
                    return SubscriptionItem::Resync {
                        last_version: self.tracker.last_version(),
                    };
                }
                Err(broadcast::error::RecvError::Closed) => return SubscriptionItem::Closed,
            }
        }
    }
}
