//! MatchesManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with per-match versions
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Publishing accepted state to match subscribers
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Take the per-match lock
//!     ├─ 3. Begin write transaction (+ idempotency re-check)
//!     ├─ 4. Create CommandContext from the stored snapshot
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Apply events to the snapshot via EventApplier
//!     ├─ 7. Persist events, snapshot, live index, processed marker
//!     ├─ 8. Commit transaction
//!     ├─ 9. Publish StateUpdate (still under the match lock)
//!     └─ 10. Return response
//! ```
//!
//! Everything between 2 and 9 runs under one match's lock, so commands on a
//! match are totally ordered and subscribers see versions in that order.
//! Commands on different matches only contend on redb's single writer.

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::appliers::{self, EventAction};
use super::broadcast::{MatchBroadcaster, MatchSubscription};
use super::overs;
use super::policy::ScoringRules;
use super::storage::MatchStorage;
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier};
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::scoring::{
    CommandResponse, Innings, MatchCommand, MatchCommandPayload, MatchEvent, MatchSnapshot,
    OperatorRole, ScoringRights, StateUpdate,
};
use std::path::Path;
use std::sync::Arc;

/// Operator recorded on server-issued commands
const SYSTEM_OPERATOR_ID: &str = "system";
const SYSTEM_OPERATOR_NAME: &str = "Rights Expiry";

/// MatchesManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
#[derive(Clone)]
pub struct MatchesManager {
    storage: MatchStorage,
    broadcaster: MatchBroadcaster,
    /// One lock per match; serializes command execution and subscribe
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    rules: ScoringRules,
}

impl std::fmt::Debug for MatchesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchesManager")
            .field("storage", &"<MatchStorage>")
            .field("broadcaster", &self.broadcaster)
            .field("epoch", &self.epoch)
            .field("rules", &self.rules)
            .finish()
    }
}

impl MatchesManager {
    /// Create a new MatchesManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        rules: ScoringRules,
        broadcast_capacity: usize,
    ) -> ManagerResult<Self> {
        let storage = MatchStorage::open(db_path)?;
        let manager = Self::from_parts(storage, rules, MatchBroadcaster::new(broadcast_capacity));
        tracing::info!(
            epoch = %manager.epoch,
            scorer_policy = ?rules.scorer_policy,
            rotate_rights = rules.rotate_rights_between_innings,
            "MatchesManager started with new epoch"
        );
        Ok(manager)
    }

    fn from_parts(storage: MatchStorage, rules: ScoringRules, broadcaster: MatchBroadcaster) -> Self {
        Self {
            storage,
            broadcaster,
            locks: Arc::new(DashMap::new()),
            epoch: uuid::Uuid::new_v4().to_string(),
            rules,
        }
    }

    /// Create a MatchesManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: MatchStorage, rules: ScoringRules) -> Self {
        Self::from_parts(storage, rules, MatchBroadcaster::default())
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn broadcaster(&self) -> &MatchBroadcaster {
        &self.broadcaster
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &MatchStorage {
        &self.storage
    }

    fn lock_for(&self, match_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(match_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: MatchCommand) -> CommandResponse {
        match self.process_command(&cmd) {
            Ok(response) => response,
            Err(err) => {
                let code = err.code();
                if code.is_authorization() {
                    let error_code = format!("{:?}", code);
                    crate::security_log!(
                        "WARN",
                        "scoring_command_denied",
                        command = cmd.payload.name(),
                        match_id = cmd.match_id().unwrap_or("-"),
                        operator_id = %cmd.operator_id,
                        role = ?cmd.role,
                        error_code = %error_code,
                        reason = %err
                    );
                } else {
                    tracing::debug!(
                        command_id = %cmd.command_id,
                        command = cmd.payload.name(),
                        error = %err,
                        "Command rejected"
                    );
                }
                CommandResponse::error(cmd.command_id, err.into())
            }
        }
    }

    /// Process command under the match lock
    fn process_command(&self, cmd: &MatchCommand) -> ManagerResult<CommandResponse> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before lock)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok(CommandResponse::duplicate(cmd.command_id.clone()));
        }

        // ScheduleMatch creates the match, so the server assigns its id
        let match_id = match cmd.match_id() {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };

        // 2. Per-match lock, held through publish
        let lock = self.lock_for(&match_id);
        let _guard = lock.lock();

        // 3. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok(CommandResponse::duplicate(cmd.command_id.clone()));
        }

        let current = self.storage.get_snapshot_txn(&txn, &match_id)?;

        // 4-5. Context + action
        let metadata = CommandMetadata::from(cmd);
        let action = CommandAction::new(cmd, match_id.clone());
        let events = {
            let mut ctx =
                CommandContext::new(&txn, &self.storage, match_id.clone(), current.clone(), self.rules);
            action.execute(&mut ctx, &metadata)?
        };

        // Accepted without a state change (e.g. repeated request by the same captain)
        if events.is_empty() {
            let snapshot = current.ok_or_else(|| ManagerError::MatchNotFound(match_id.clone()))?;
            self.storage.mark_command_processed(&txn, &cmd.command_id)?;
            txn.commit().map_err(super::storage::StorageError::from)?;
            return Ok(CommandResponse::success(cmd.command_id.clone(), snapshot));
        }

        // 6. Apply events
        let mut snapshot = current.unwrap_or_else(|| MatchSnapshot::new(match_id.clone()));
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
            self.storage.store_event(&txn, event)?;
        }

        if events.last().is_some_and(|e| e.version != snapshot.version) {
            return Err(ManagerError::Internal(format!(
                "Snapshot of {} did not advance to the last event version",
                match_id
            )));
        }

        // 7. Persist
        self.storage.store_snapshot(&txn, &snapshot)?;
        if snapshot.is_terminal() {
            self.storage.mark_match_finished(&txn, &match_id)?;
        } else {
            self.storage.mark_match_live(&txn, &match_id)?;
        }
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 8. Commit
        txn.commit().map_err(super::storage::StorageError::from)?;

        tracing::info!(
            match_id = %match_id,
            command = cmd.payload.name(),
            version = snapshot.version,
            events = events.len(),
            status = ?snapshot.status,
            rights = snapshot.rights.state_name(),
            "Command applied"
        );

        // 9. Publish under the lock so subscribers see command order
        self.publish(cmd, &snapshot, events);
        if snapshot.is_terminal() {
            self.broadcaster.close(&match_id);
        }

        Ok(CommandResponse::success(cmd.command_id.clone(), snapshot))
    }

    fn publish(&self, cmd: &MatchCommand, snapshot: &MatchSnapshot, events: Vec<MatchEvent>) {
        let receivers = self.broadcaster.publish(StateUpdate {
            match_id: snapshot.match_id.clone(),
            version: snapshot.version,
            command_id: cmd.command_id.clone(),
            events,
            snapshot: snapshot.clone(),
        });
        tracing::debug!(
            match_id = %snapshot.match_id,
            version = snapshot.version,
            receivers,
            "State update published"
        );
    }

    // ========== Subscriptions ==========

    /// Subscribe to a match: initial snapshot plus every later update
    ///
    /// Snapshot read and channel attach happen under the match lock, so no
    /// update is missed or delivered twice.
    pub fn subscribe(&self, match_id: &str) -> ManagerResult<MatchSubscription> {
        let lock = self.lock_for(match_id);
        let _guard = lock.lock();

        let snapshot = self
            .storage
            .get_snapshot(match_id)?
            .ok_or_else(|| ManagerError::MatchNotFound(match_id.to_string()))?;

        if snapshot.is_terminal() {
            return Ok(MatchSubscription::finished(snapshot));
        }
        let rx = self.broadcaster.attach(match_id);
        tracing::debug!(
            match_id = %match_id,
            version = snapshot.version,
            subscribers = self.broadcaster.subscriber_count(match_id),
            "Subscriber attached"
        );
        Ok(MatchSubscription::new(snapshot, rx))
    }

    // ========== Rights Expiry ==========

    /// Cancel every pending request older than `timeout_ms` at `now`
    ///
    /// Returns the matches whose request was cancelled.
    pub fn expire_stale_requests(&self, now: i64, timeout_ms: i64) -> ManagerResult<Vec<String>> {
        let mut expired = Vec::new();
        for snapshot in self.storage.get_live_matches()? {
            let ScoringRights::Requested { requested_at, .. } = &snapshot.rights else {
                continue;
            };
            if now.saturating_sub(*requested_at) < timeout_ms {
                continue;
            }

            let cmd = MatchCommand::new(
                SYSTEM_OPERATOR_ID,
                SYSTEM_OPERATOR_NAME,
                MatchCommandPayload::CancelRightsRequest {
                    match_id: snapshot.match_id.clone(),
                },
            )
            .with_role(OperatorRole::System);

            let response = self.execute_command(cmd);
            if response.success {
                tracing::info!(
                    match_id = %snapshot.match_id,
                    requested_at,
                    "Stale scoring-rights request expired"
                );
                expired.push(snapshot.match_id);
            } else {
                // Request was approved or withdrawn since the scan
                tracing::debug!(
                    match_id = %snapshot.match_id,
                    error = ?response.error_code(),
                    "Stale request no longer pending"
                );
            }
        }
        Ok(expired)
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by match ID
    pub fn get_snapshot(&self, match_id: &str) -> ManagerResult<MatchSnapshot> {
        self.storage
            .get_snapshot(match_id)?
            .ok_or_else(|| ManagerError::MatchNotFound(match_id.to_string()))
    }

    /// Get all non-terminal match snapshots
    pub fn get_live_matches(&self) -> ManagerResult<Vec<MatchSnapshot>> {
        Ok(self.storage.get_live_matches()?)
    }

    /// Get events of a match after a given version
    pub fn get_events_since(&self, match_id: &str, since_version: u64) -> ManagerResult<Vec<MatchEvent>> {
        Ok(self.storage.get_events_since(match_id, since_version)?)
    }

    /// Get all events for a specific match
    pub fn get_events_for_match(&self, match_id: &str) -> ManagerResult<Vec<MatchEvent>> {
        Ok(self.storage.get_events_for_match(match_id)?)
    }

    /// Rebuild a snapshot from events (for verification)
    ///
    /// Uses EventApplier to apply each event to build the snapshot.
    pub fn rebuild_snapshot(&self, match_id: &str) -> ManagerResult<MatchSnapshot> {
        let events = self.storage.get_events_for_match(match_id)?;
        if events.is_empty() {
            return Err(ManagerError::MatchNotFound(match_id.to_string()));
        }
        Ok(appliers::rebuild(match_id, &events))
    }

    /// Whether the stored snapshot equals a replay of the event stream, and
    /// every innings equals a replay of its delivery log
    pub fn verify_snapshot(&self, match_id: &str) -> ManagerResult<bool> {
        // 三次读取分属不同事务，持锁保证读到同一版本
        let lock = self.lock_for(match_id);
        let _guard = lock.lock();

        let stored = self.get_snapshot(match_id)?;
        let rebuilt = self.rebuild_snapshot(match_id)?;
        let mut consistent = stored == rebuilt && stored.verify_checksum();
        if !consistent {
            tracing::error!(
                match_id = %match_id,
                stored_version = stored.version,
                rebuilt_version = rebuilt.version,
                stored_checksum = %stored.state_checksum,
                rebuilt_checksum = %rebuilt.state_checksum,
                "Snapshot drift detected"
            );
        }

        for innings in &stored.innings {
            if !self.verify_innings_log(match_id, innings)? {
                consistent = false;
            }
        }
        Ok(consistent)
    }

    /// Replay one innings' delivery log and compare with the stored totals
    fn verify_innings_log(&self, match_id: &str, innings: &Innings) -> ManagerResult<bool> {
        let balls = self.storage.get_deliveries(match_id, innings.innings_number)?;
        let replayed = match overs::replay(innings, &balls) {
            Ok(mut replayed) => {
                // 日志只决定累计值，是否结束由生命周期事件决定
                replayed.is_completed = innings.is_completed;
                replayed
            }
            Err(e) => {
                tracing::error!(
                    match_id = %match_id,
                    innings = innings.innings_number,
                    error = %e,
                    "Delivery log does not replay"
                );
                return Ok(false);
            }
        };

        if replayed != *innings {
            tracing::error!(
                match_id = %match_id,
                innings = innings.innings_number,
                log_len = balls.len(),
                stored = %innings.score_line(),
                replayed = %replayed.score_line(),
                "Innings drift from delivery log"
            );
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests;
