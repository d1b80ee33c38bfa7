//! Scoring-rights state machine
//!
//! ```text
//! Unclaimed ──request──▶ Requested ──approve──▶ Approved ──release──▶ Released
//!     ▲                      │                                          │
//!     └────────cancel────────┘                  ◀──────request──────────┘
//! ```
//!
//! Guards only: they inspect a snapshot and decide whether a transition is
//! legal. The transition itself is an event applied by `appliers/`.

use shared::scoring::{CancelReason, MatchSnapshot, OperatorRole, ScoringRights};

use super::policy::{ScorerPolicy, ScoringRules};
use super::traits::{CommandMetadata, MatchError};

/// Result of a legal rights request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Transition to Requested
    Open,
    /// Same captain already waiting: nothing to do
    AlreadyPending,
}

/// `RequestRights(match, captain)`
pub fn check_request(snapshot: &MatchSnapshot, captain_id: &str) -> Result<RequestOutcome, MatchError> {
    if snapshot.team_of_captain(captain_id).is_none() {
        return Err(MatchError::NotACaptainOfEitherTeam(captain_id.to_string()));
    }
    if snapshot.is_terminal() {
        return Err(MatchError::MatchNotScheduledOrReleased(format!(
            "match is {}",
            snapshot.status
        )));
    }

    match &snapshot.rights {
        ScoringRights::Unclaimed | ScoringRights::Released { .. } => Ok(RequestOutcome::Open),
        ScoringRights::Requested {
            requesting_captain_id,
            ..
        } if requesting_captain_id == captain_id => Ok(RequestOutcome::AlreadyPending),
        ScoringRights::Requested {
            requesting_captain_id,
            ..
        } => Err(MatchError::RightsAlreadyRequested(
            requesting_captain_id.clone(),
        )),
        ScoringRights::Approved { .. } => Err(MatchError::MatchNotScheduledOrReleased(
            "rights are APPROVED".to_string(),
        )),
    }
}

/// `ApproveRights(match, approver)`; returns the requesting captain
pub fn check_approve(snapshot: &MatchSnapshot, approver_id: &str) -> Result<String, MatchError> {
    let requester = snapshot
        .rights
        .pending_requester()
        .ok_or(MatchError::NoPendingRequest)?;

    if requester == approver_id {
        return Err(MatchError::InvalidApprover(format!(
            "{approver_id} cannot approve their own request"
        )));
    }

    let requester_team = snapshot
        .team_of_captain(requester)
        .map(|t| t.team_id.as_str());
    let approver_team = snapshot
        .team_of_captain(approver_id)
        .map(|t| t.team_id.as_str());
    match (requester_team, approver_team) {
        (Some(req), Some(app)) if req != app => Ok(requester.to_string()),
        _ => Err(MatchError::InvalidApprover(format!(
            "{approver_id} does not captain the opposing team"
        ))),
    }
}

/// `CancelRequest(match, caller)`; returns the withdrawn requester and why
pub fn check_cancel(
    snapshot: &MatchSnapshot,
    metadata: &CommandMetadata,
) -> Result<(String, CancelReason), MatchError> {
    let requester = snapshot
        .rights
        .pending_requester()
        .ok_or(MatchError::NoPendingRequest)?;

    let reason = match metadata.role {
        OperatorRole::System => CancelReason::Expired,
        OperatorRole::Admin => CancelReason::AdminOverride,
        OperatorRole::Captain if metadata.operator_id == requester => CancelReason::Withdrawn,
        OperatorRole::Captain => {
            return Err(MatchError::CancelNotPermitted(metadata.operator_id.clone()));
        }
    };
    Ok((requester.to_string(), reason))
}

/// Explicit `ReleaseRights(match, caller)`
pub fn check_release(snapshot: &MatchSnapshot, metadata: &CommandMetadata) -> Result<(), MatchError> {
    let holder = snapshot.rights.holder().ok_or(MatchError::NoActiveGrant)?;
    if holder != metadata.operator_id && !metadata.is_override() {
        return Err(MatchError::RightsNotHeldByCaller(
            metadata.operator_id.clone(),
        ));
    }
    Ok(())
}

/// Caller may feed the over engine (ball / undo)
///
/// Only the holder of an approved grant qualifies; no override role scores.
pub fn check_scorer(
    snapshot: &MatchSnapshot,
    caller_id: &str,
    rules: &ScoringRules,
) -> Result<(), MatchError> {
    if snapshot.rights.holder() != Some(caller_id) {
        return Err(MatchError::RightsNotHeldByCaller(caller_id.to_string()));
    }

    if rules.scorer_policy == ScorerPolicy::FieldingCaptainOnly
        && let (Some(team), Some(innings)) = (
            snapshot.team_of_captain(caller_id),
            snapshot.current_innings(),
        )
        && team.team_id == innings.batting_team_id
    {
        return Err(MatchError::ScorerPolicyViolation(format!(
            "{caller_id} captains the batting side {}",
            innings.batting_team_id
        )));
    }
    Ok(())
}
