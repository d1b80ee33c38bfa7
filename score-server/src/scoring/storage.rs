//! redb-based storage layer for match scoring
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(match_id, version)` | `MatchEvent` | Match event stream (append-only) |
//! | `snapshots` | `match_id` | `MatchSnapshot` | Derived match state |
//! | `deliveries` | `(match_id, innings_number, sequence)` | `BallEvent` | Per-innings delivery log |
//! | `live_matches` | `match_id` | `()` | Non-terminal match index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//!
//! The delivery log is the source of truth for innings totals. It is only
//! touched inside the same write transaction that appends the match event and
//! writes the snapshot, so log and projection can never diverge.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::scoring::{BallEvent, MatchEvent, MatchSnapshot};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = (match_id, version), value = JSON MatchEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// key = match_id, value = JSON MatchSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// key = (match_id, innings_number, sequence_number), value = JSON BallEvent
const DELIVERIES_TABLE: TableDefinition<(&str, u32, u64), &[u8]> =
    TableDefinition::new("deliveries");

/// key = match_id (Scheduled or Live), value = empty
const LIVE_MATCHES_TABLE: TableDefinition<&str, ()> = TableDefinition::new("live_matches");

/// key = command_id, value = empty
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Match storage backed by redb
#[derive(Clone)]
pub struct MatchStorage {
    db: Arc<Database>,
}

impl MatchStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns the
    /// delivery, event and snapshot are on disk together.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(DELIVERIES_TABLE)?;
            let _ = write_txn.open_table(LIVE_MATCHES_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Match Event Stream ==========

    /// Append an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &MatchEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let value = serde_json::to_vec(event)?;
        table.insert((event.match_id.as_str(), event.version), value.as_slice())?;
        Ok(())
    }

    /// All events of a match, in version order
    pub fn get_events_for_match(&self, match_id: &str) -> StorageResult<Vec<MatchEvent>> {
        self.get_events_since(match_id, 0)
    }

    /// Events of a match with `version > since_version`, in version order
    pub fn get_events_since(
        &self,
        match_id: &str,
        since_version: u64,
    ) -> StorageResult<Vec<MatchEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let Some(start) = since_version.checked_add(1) else {
            return Ok(events);
        };
        for result in table.range((match_id, start)..=(match_id, u64::MAX))? {
            let (_key, value) = result?;
            events.push(serde_json::from_slice::<MatchEvent>(value.value())?);
        }
        Ok(events)
    }

    // ========== Snapshots ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &MatchSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.match_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by match ID
    pub fn get_snapshot(&self, match_id: &str) -> StorageResult<Option<MatchSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(match_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a snapshot by match ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        match_id: &str,
    ) -> StorageResult<Option<MatchSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(match_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Delivery Log ==========

    /// Append a delivery to an innings log
    pub fn append_delivery(
        &self,
        txn: &WriteTransaction,
        match_id: &str,
        innings_number: u32,
        ball: &BallEvent,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(DELIVERIES_TABLE)?;
        let value = serde_json::to_vec(ball)?;
        table.insert(
            (match_id, innings_number, ball.sequence_number),
            value.as_slice(),
        )?;
        Ok(())
    }

    /// Innings log in sequence order (within transaction)
    pub fn get_deliveries_txn(
        &self,
        txn: &WriteTransaction,
        match_id: &str,
        innings_number: u32,
    ) -> StorageResult<Vec<BallEvent>> {
        let table = txn.open_table(DELIVERIES_TABLE)?;
        let mut balls = Vec::new();
        for result in
            table.range((match_id, innings_number, 0u64)..=(match_id, innings_number, u64::MAX))?
        {
            let (_key, value) = result?;
            balls.push(serde_json::from_slice::<BallEvent>(value.value())?);
        }
        Ok(balls)
    }

    /// Innings log in sequence order
    pub fn get_deliveries(&self, match_id: &str, innings_number: u32) -> StorageResult<Vec<BallEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DELIVERIES_TABLE)?;
        let mut balls = Vec::new();
        for result in
            table.range((match_id, innings_number, 0u64)..=(match_id, innings_number, u64::MAX))?
        {
            let (_key, value) = result?;
            balls.push(serde_json::from_slice::<BallEvent>(value.value())?);
        }
        Ok(balls)
    }

    /// Highest sequence number still in the innings log
    pub fn last_delivery_sequence(
        &self,
        txn: &WriteTransaction,
        match_id: &str,
        innings_number: u32,
    ) -> StorageResult<Option<u64>> {
        let table = txn.open_table(DELIVERIES_TABLE)?;
        let mut range =
            table.range((match_id, innings_number, 0u64)..=(match_id, innings_number, u64::MAX))?;
        let last = range.next_back();
        let sequence = match last {
            Some(entry) => {
                let (key, _value) = entry?;
                let (_, _, sequence) = key.value();
                Some(sequence)
            }
            None => None,
        };
        Ok(sequence)
    }

    /// Remove and return the most recent delivery of an innings
    pub fn pop_last_delivery(
        &self,
        txn: &WriteTransaction,
        match_id: &str,
        innings_number: u32,
    ) -> StorageResult<Option<BallEvent>> {
        let mut table = txn.open_table(DELIVERIES_TABLE)?;
        let last = {
            let mut range = table
                .range((match_id, innings_number, 0u64)..=(match_id, innings_number, u64::MAX))?;
            let entry = range.next_back();
            let ball = match entry {
                Some(entry) => {
                    let (_key, value) = entry?;
                    Some(serde_json::from_slice::<BallEvent>(value.value())?)
                }
                None => None,
            };
            ball
        };

        if let Some(ball) = &last {
            table.remove((match_id, innings_number, ball.sequence_number))?;
        }
        Ok(last)
    }

    // ========== Live Matches ==========

    /// Mark a match as live (Scheduled or Live)
    pub fn mark_match_live(&self, txn: &WriteTransaction, match_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(LIVE_MATCHES_TABLE)?;
        table.insert(match_id, ())?;
        Ok(())
    }

    /// Remove a match from the live index (terminal)
    pub fn mark_match_finished(&self, txn: &WriteTransaction, match_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(LIVE_MATCHES_TABLE)?;
        table.remove(match_id)?;
        Ok(())
    }

    /// Get all non-terminal match IDs
    pub fn get_live_match_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIVE_MATCHES_TABLE)?;

        let mut match_ids = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            match_ids.push(key.value().to_string());
        }
        Ok(match_ids)
    }

    /// Get snapshots of all non-terminal matches
    pub fn get_live_matches(&self) -> StorageResult<Vec<MatchSnapshot>> {
        let mut snapshots = Vec::new();
        for match_id in self.get_live_match_ids()? {
            if let Some(snapshot) = self.get_snapshot(&match_id)? {
                snapshots.push(snapshot);
            }
        }
        Ok(snapshots)
    }
}
