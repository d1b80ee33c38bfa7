//! Command and event traits for the scoring pipeline
//!
//! - [`CommandHandler`]: validates a command against the current snapshot and
//!   produces events (one implementation per action, see `actions/`)
//! - [`EventApplier`]: folds one event into a snapshot (one implementation per
//!   event type, see `appliers/`)
//! - [`CommandContext`]: everything an action may touch, bound to the open
//!   redb write transaction

use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::scoring::{
    BallEvent, CommandErrorCode, MatchEvent, MatchSnapshot, MatchStatus, OperatorRole,
};
use thiserror::Error;

use super::overs::DeliveryError;
use super::policy::ScoringRules;
use super::storage::{MatchStorage, StorageError};

/// Action-level errors, one variant per violated invariant
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    MatchNotFound(String),

    // ========== Rights state machine ==========
    #[error("Scoring rights already requested by {0}")]
    RightsAlreadyRequested(String),

    #[error("Scoring rights cannot be requested while {0}")]
    MatchNotScheduledOrReleased(String),

    #[error("No pending scoring-rights request")]
    NoPendingRequest,

    #[error("No active scoring grant")]
    NoActiveGrant,

    #[error("Scoring rights not approved (state: {0})")]
    RightsNotApproved(&'static str),

    // ========== Authorization ==========
    #[error("{0} is not a captain of either team")]
    NotACaptainOfEitherTeam(String),

    #[error("Invalid approver: {0}")]
    InvalidApprover(String),

    #[error("Scoring rights not held by {0}")]
    RightsNotHeldByCaller(String),

    #[error("{0} may not cancel this request")]
    CancelNotPermitted(String),

    #[error("Scorer policy violation: {0}")]
    ScorerPolicyViolation(String),

    // ========== Lifecycle ==========
    #[error("Match is not scheduled (status: {0})")]
    MatchNotScheduled(MatchStatus),

    #[error("Match is not live (status: {0})")]
    MatchNotLive(MatchStatus),

    #[error("Match already finished (status: {0})")]
    MatchAlreadyFinished(MatchStatus),

    #[error("No further innings: match already has {0}")]
    NoFurtherInnings(usize),

    #[error("Invalid winner: {0} is not a competing team")]
    InvalidWinner(String),

    // ========== Deliveries ==========
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Nothing to undo in innings {0}")]
    NothingToUndo(u32),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MatchError {
    /// Wire code for this rejection
    pub fn code(&self) -> CommandErrorCode {
        match self {
            MatchError::MatchNotFound(_) => CommandErrorCode::MatchNotFound,
            MatchError::RightsAlreadyRequested(_) => CommandErrorCode::RightsAlreadyRequested,
            MatchError::MatchNotScheduledOrReleased(_) => {
                CommandErrorCode::MatchNotScheduledOrReleased
            }
            MatchError::NoPendingRequest => CommandErrorCode::NoPendingRequest,
            MatchError::NoActiveGrant => CommandErrorCode::NoActiveGrant,
            MatchError::RightsNotApproved(_) => CommandErrorCode::RightsNotApproved,
            MatchError::NotACaptainOfEitherTeam(_) => CommandErrorCode::NotACaptainOfEitherTeam,
            MatchError::InvalidApprover(_) => CommandErrorCode::InvalidApprover,
            MatchError::RightsNotHeldByCaller(_) => CommandErrorCode::RightsNotHeldByCaller,
            MatchError::CancelNotPermitted(_) => CommandErrorCode::CancelNotPermitted,
            MatchError::ScorerPolicyViolation(_) => CommandErrorCode::ScorerPolicyViolation,
            MatchError::MatchNotScheduled(_) => CommandErrorCode::MatchNotScheduled,
            MatchError::MatchNotLive(_) => CommandErrorCode::MatchNotLive,
            MatchError::MatchAlreadyFinished(_) => CommandErrorCode::MatchAlreadyFinished,
            MatchError::NoFurtherInnings(_) => CommandErrorCode::NoFurtherInnings,
            MatchError::InvalidWinner(_) => CommandErrorCode::InvalidWinner,
            MatchError::Delivery(DeliveryError::InningsCompleted(_)) => {
                CommandErrorCode::InningsCompleted
            }
            MatchError::Delivery(DeliveryError::WicketLimitExceeded) => {
                CommandErrorCode::WicketLimitExceeded
            }
            MatchError::Delivery(DeliveryError::InvalidEventShape(_)) => {
                CommandErrorCode::InvalidEventShape
            }
            MatchError::NothingToUndo(_) => CommandErrorCode::NothingToUndo,
            MatchError::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
            MatchError::Storage(_) => CommandErrorCode::InternalError,
        }
    }
}

/// Command metadata carried into every event
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    pub role: OperatorRole,
    /// Client timestamp
    pub timestamp: i64,
}

impl CommandMetadata {
    pub fn is_override(&self) -> bool {
        self.role.is_override()
    }
}

/// Execution context for one command on one match
///
/// Holds the snapshot as it was when the match lock was taken. Actions read
/// it, allocate versions and touch the delivery log; they never write the
/// snapshot themselves (that is the appliers' job).
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a MatchStorage,
    match_id: String,
    snapshot: Option<MatchSnapshot>,
    current_version: u64,
    rules: ScoringRules,
    now: i64,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a MatchStorage,
        match_id: impl Into<String>,
        snapshot: Option<MatchSnapshot>,
        rules: ScoringRules,
    ) -> Self {
        let current_version = snapshot.as_ref().map(|s| s.version).unwrap_or(0);
        Self {
            txn,
            storage,
            match_id: match_id.into(),
            snapshot,
            current_version,
            rules,
            now: shared::util::now_millis(),
        }
    }

    /// Override the server clock (expiry sweeps, tests)
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Server time for this command
    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Current snapshot of the match (owned copy)
    pub fn load_snapshot(&self) -> Result<MatchSnapshot, MatchError> {
        self.snapshot
            .clone()
            .ok_or_else(|| MatchError::MatchNotFound(self.match_id.clone()))
    }

    pub fn match_exists(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Allocate the next per-match version
    pub fn next_version(&mut self) -> u64 {
        self.current_version += 1;
        self.current_version
    }

    /// Build an event for this match at the next version
    pub fn event(
        &mut self,
        metadata: &CommandMetadata,
        payload: shared::scoring::EventPayload,
    ) -> MatchEvent {
        let version = self.next_version();
        MatchEvent::new(
            version,
            self.match_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            payload.event_type(),
            payload,
        )
    }

    // ========== Delivery log ==========

    /// Sequence number the next recorded delivery will get
    pub fn next_delivery_sequence(&self, innings_number: u32) -> Result<u64, MatchError> {
        let last = self
            .storage
            .last_delivery_sequence(self.txn, &self.match_id, innings_number)?;
        Ok(last.map(|seq| seq + 1).unwrap_or(1))
    }

    pub fn record_delivery(&self, innings_number: u32, ball: &BallEvent) -> Result<(), MatchError> {
        self.storage
            .append_delivery(self.txn, &self.match_id, innings_number, ball)?;
        Ok(())
    }

    pub fn pop_last_delivery(&self, innings_number: u32) -> Result<Option<BallEvent>, MatchError> {
        Ok(self
            .storage
            .pop_last_delivery(self.txn, &self.match_id, innings_number)?)
    }

    pub fn deliveries(&self, innings_number: u32) -> Result<Vec<BallEvent>, MatchError> {
        Ok(self
            .storage
            .get_deliveries_txn(self.txn, &self.match_id, innings_number)?)
    }
}

/// Command handler - validates and produces events
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError>;
}

/// Event applier - folds one event into the snapshot
///
/// Appliers are pure: same snapshot + event gives the same result. Each one
/// advances `version`/`updated_at` and refreshes the checksum.
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_errors_keep_their_codes() {
        let err: MatchError = DeliveryError::WicketLimitExceeded.into();
        assert_eq!(err.code(), CommandErrorCode::WicketLimitExceeded);
        let err: MatchError = DeliveryError::InningsCompleted(1).into();
        assert_eq!(err.code(), CommandErrorCode::InningsCompleted);
        assert_eq!(err.to_string(), "Innings 1 is already completed");
    }

    #[test]
    fn test_context_versions_continue_from_snapshot() {
        let storage = MatchStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = MatchSnapshot::new("m-1".to_string());
        snapshot.version = 7;

        let mut ctx = CommandContext::new(&txn, &storage, "m-1", Some(snapshot), ScoringRules::default());
        assert_eq!(ctx.next_version(), 8);
        assert_eq!(ctx.next_version(), 9);
        assert_eq!(ctx.next_delivery_sequence(1).unwrap(), 1);
    }

    #[test]
    fn test_missing_match() {
        let storage = MatchStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, "nope", None, ScoringRules::default());
        assert!(matches!(ctx.load_snapshot(), Err(MatchError::MatchNotFound(id)) if id == "nope"));
    }
}
