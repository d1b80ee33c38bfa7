//! Synchronization API for subscriber reconnection
//!
//! A client that lost its stream reconnects with the last version it applied.
//!
//! # Protocol
//!
//! 1. Client sends `(match_id, since_version)`
//! 2. Server compares it with the match version
//! 3. Small gap: the missing events, in version order
//! 4. Large gap, unknown history or a client ahead of the server: full snapshot
//!
//! The snapshot and server epoch ride along on every response, so a client
//! can always verify its checksum and notice a server restart.

use super::manager::{ManagerResult, MatchesManager};
use shared::scoring::{MatchSnapshot, SyncRequest, SyncResponse};

/// Maximum events returned in incremental sync
pub const DEFAULT_MAX_INCREMENTAL_EVENTS: u64 = 500;

/// Sync service for handling reconnection
#[derive(Debug, Clone)]
pub struct SyncService {
    manager: MatchesManager,
    max_incremental: u64,
}

impl SyncService {
    pub fn new(manager: MatchesManager, max_incremental: u64) -> Self {
        Self {
            manager,
            max_incremental: max_incremental.max(1),
        }
    }

    /// Handle a sync request
    pub fn sync(&self, request: &SyncRequest) -> ManagerResult<SyncResponse> {
        let snapshot = self.manager.get_snapshot(&request.match_id)?;
        let epoch = self.manager.epoch().to_string();
        let server_version = snapshot.version;
        let since = request.since_version;

        // Up to date
        if since == server_version {
            return Ok(SyncResponse::incremental(vec![], snapshot, epoch));
        }

        // Fresh client, or one that saw versions this server never issued
        if since == 0 || since > server_version {
            tracing::debug!(
                match_id = %request.match_id,
                since,
                server_version,
                "Full sync"
            );
            return Ok(SyncResponse::full_sync(snapshot, epoch));
        }

        if server_version - since > self.max_incremental {
            tracing::debug!(
                match_id = %request.match_id,
                gap = server_version - since,
                max = self.max_incremental,
                "Gap too large, full sync"
            );
            return Ok(SyncResponse::full_sync(snapshot, epoch));
        }

        let events = self.manager.get_events_since(&request.match_id, since)?;

        // Double-check: the range must be exactly since+1..=server_version
        let contiguous = events
            .iter()
            .zip(since + 1..)
            .all(|(event, expected)| event.version == expected)
            && events.len() as u64 == server_version - since;
        if !contiguous {
            tracing::warn!(
                match_id = %request.match_id,
                since,
                server_version,
                returned = events.len(),
                "Event range not contiguous, falling back to full sync"
            );
            return Ok(SyncResponse::full_sync(snapshot, epoch));
        }

        Ok(SyncResponse::incremental(events, snapshot, epoch))
    }

    /// Current snapshot (initial connection)
    pub fn snapshot(&self, match_id: &str) -> ManagerResult<MatchSnapshot> {
        self.manager.get_snapshot(match_id)
    }

    /// Verify every live match snapshot
    pub fn verify_all_snapshots(&self) -> ManagerResult<Vec<(String, bool)>> {
        let mut results = Vec::new();
        for snapshot in self.manager.get_live_matches()? {
            let is_valid = self.manager.verify_snapshot(&snapshot.match_id)?;
            results.push((snapshot.match_id, is_valid));
        }
        Ok(results)
    }
}
