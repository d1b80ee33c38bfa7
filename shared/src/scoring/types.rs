//! Shared types for match scoring

use serde::{Deserialize, Serialize};
use std::fmt;

/// Balls in one over
pub const BALLS_PER_OVER: u32 = 6;

/// Wicket ceiling for one innings
pub const MAX_WICKETS: u8 = 10;

/// Highest runs accepted off the bat for a single delivery (all-run five plus overthrows)
pub const MAX_RUNS_OFF_BAT: u32 = 7;

// ============================================================================
// Teams
// ============================================================================

/// One of the two competing teams
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamSide {
    pub team_id: String,
    pub name: String,
    /// Captain allowed to request / approve scoring rights for this side
    pub captain_id: String,
}

/// Role of the operator issuing a command (identity is asserted by the host)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorRole {
    #[default]
    Captain,
    /// Administrative override (admin tooling)
    Admin,
    /// Server-internal commands (request expiry)
    System,
}

impl OperatorRole {
    pub fn is_override(&self) -> bool {
        matches!(self, OperatorRole::Admin | OperatorRole::System)
    }
}

// ============================================================================
// Overs
// ============================================================================

/// Over count as an integer pair
///
/// `3.2` means three completed overs and two legal balls of the fourth.
/// Never stored as a decimal: `0.10` is not a valid over count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub struct OverCount {
    pub completed_overs: u32,
    pub balls_in_current_over: u32,
}

impl OverCount {
    pub fn new(completed_overs: u32, balls_in_current_over: u32) -> Self {
        let carry = balls_in_current_over / BALLS_PER_OVER;
        Self {
            completed_overs: completed_overs + carry,
            balls_in_current_over: balls_in_current_over % BALLS_PER_OVER,
        }
    }

    pub fn from_balls(balls: u32) -> Self {
        Self::new(0, balls)
    }

    /// Total legal deliveries bowled
    pub fn total_balls(&self) -> u32 {
        self.completed_overs * BALLS_PER_OVER + self.balls_in_current_over
    }

    /// Count one more legal delivery, rolling into the next over at six
    pub fn advance(self) -> Self {
        if self.balls_in_current_over + 1 == BALLS_PER_OVER {
            Self {
                completed_overs: self.completed_overs + 1,
                balls_in_current_over: 0,
            }
        } else {
            Self {
                completed_overs: self.completed_overs,
                balls_in_current_over: self.balls_in_current_over + 1,
            }
        }
    }

    /// Overs as a real number of overs (3.2 overs → 3.333…), for run-rate maths only
    pub fn as_fractional_overs(&self) -> f64 {
        f64::from(self.total_balls()) / f64::from(BALLS_PER_OVER)
    }
}

impl fmt::Display for OverCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.completed_overs, self.balls_in_current_over)
    }
}

// ============================================================================
// Deliveries
// ============================================================================

/// Extra classification of a delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtraKind {
    #[default]
    None,
    Wide,
    NoBall,
    Bye,
    LegBye,
}

impl ExtraKind {
    /// Wides and no-balls are re-bowled and do not count toward the over
    pub fn is_legal_delivery(&self) -> bool {
        !matches!(self, ExtraKind::Wide | ExtraKind::NoBall)
    }
}

/// Delivery as submitted by the scorer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BallInput {
    #[serde(default)]
    pub runs_off_bat: u32,
    #[serde(default)]
    pub extra_kind: ExtraKind,
    #[serde(default)]
    pub is_wicket: bool,
}

impl BallInput {
    pub fn runs(runs_off_bat: u32) -> Self {
        Self {
            runs_off_bat,
            ..Default::default()
        }
    }

    pub fn extra(extra_kind: ExtraKind, runs_off_bat: u32) -> Self {
        Self {
            runs_off_bat,
            extra_kind,
            is_wicket: false,
        }
    }

    pub fn wicket() -> Self {
        Self {
            is_wicket: true,
            ..Default::default()
        }
    }
}

/// Immutable delivery log record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BallEvent {
    /// Position in the innings delivery log
    pub sequence_number: u64,
    pub runs_off_bat: u32,
    pub extra_kind: ExtraKind,
    pub is_wicket: bool,
    pub is_legal_delivery: bool,
    /// Server timestamp (Unix milliseconds)
    pub recorded_at: i64,
}

impl BallEvent {
    pub fn from_input(sequence_number: u64, input: &BallInput, recorded_at: i64) -> Self {
        Self {
            sequence_number,
            runs_off_bat: input.runs_off_bat,
            extra_kind: input.extra_kind,
            is_wicket: input.is_wicket,
            is_legal_delivery: input.extra_kind.is_legal_delivery(),
            recorded_at,
        }
    }

    pub fn input(&self) -> BallInput {
        BallInput {
            runs_off_bat: self.runs_off_bat,
            extra_kind: self.extra_kind,
            is_wicket: self.is_wicket,
        }
    }
}

// ============================================================================
// Scoring Rights
// ============================================================================

/// Why a grant left the Approved state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseReason {
    /// Holder or admin gave the rights back
    Explicit,
    MatchCompleted,
    MatchAbandoned,
    /// Ownership rotates for the next innings
    InningsChange,
}

/// Why a pending request was withdrawn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// Requesting captain withdrew
    Withdrawn,
    AdminOverride,
    /// No approval within the configured timeout
    Expired,
    /// Match completed or was abandoned while the request was pending
    MatchFinished,
}

/// Scoring-rights state machine of a match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringRights {
    #[default]
    Unclaimed,
    Requested {
        requesting_captain_id: String,
        requested_at: i64,
    },
    Approved {
        requesting_captain_id: String,
        approving_captain_id: String,
        requested_at: i64,
        granted_at: i64,
    },
    Released {
        released_at: i64,
        reason: ReleaseReason,
    },
}

/// Live grant view (only while Requested or Approved)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoringGrant {
    pub requesting_captain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approving_captain_id: Option<String>,
    pub requested_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_at: Option<i64>,
}

impl ScoringRights {
    pub fn grant(&self) -> Option<ScoringGrant> {
        match self {
            ScoringRights::Requested {
                requesting_captain_id,
                requested_at,
            } => Some(ScoringGrant {
                requesting_captain_id: requesting_captain_id.clone(),
                approving_captain_id: None,
                requested_at: *requested_at,
                granted_at: None,
            }),
            ScoringRights::Approved {
                requesting_captain_id,
                approving_captain_id,
                requested_at,
                granted_at,
            } => Some(ScoringGrant {
                requesting_captain_id: requesting_captain_id.clone(),
                approving_captain_id: Some(approving_captain_id.clone()),
                requested_at: *requested_at,
                granted_at: Some(*granted_at),
            }),
            ScoringRights::Unclaimed | ScoringRights::Released { .. } => None,
        }
    }

    /// Captain currently allowed to submit deliveries
    pub fn holder(&self) -> Option<&str> {
        match self {
            ScoringRights::Approved {
                requesting_captain_id,
                ..
            } => Some(requesting_captain_id),
            _ => None,
        }
    }

    /// Captain waiting for approval
    pub fn pending_requester(&self) -> Option<&str> {
        match self {
            ScoringRights::Requested {
                requesting_captain_id,
                ..
            } => Some(requesting_captain_id),
            _ => None,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ScoringRights::Approved { .. })
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            ScoringRights::Unclaimed => "UNCLAIMED",
            ScoringRights::Requested { .. } => "REQUESTED",
            ScoringRights::Approved { .. } => "APPROVED",
            ScoringRights::Released { .. } => "RELEASED",
        }
    }
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    /// Match version after the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Authoritative state after the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<super::snapshot::MatchSnapshot>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, snapshot: super::snapshot::MatchSnapshot) -> Self {
        Self {
            command_id,
            success: true,
            match_id: Some(snapshot.match_id.clone()),
            version: Some(snapshot.version),
            snapshot: Some(snapshot),
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            match_id: None,
            version: None,
            snapshot: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            match_id: None,
            version: None,
            snapshot: None,
            error: None,
        }
    }

    pub fn error_code(&self) -> Option<&CommandErrorCode> {
        self.error.as_ref().map(|e| &e.code)
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    MatchNotFound,
    // Rights state machine
    RightsAlreadyRequested,
    MatchNotScheduledOrReleased,
    NoPendingRequest,
    NoActiveGrant,
    RightsNotApproved,
    // Authorization
    NotACaptainOfEitherTeam,
    InvalidApprover,
    RightsNotHeldByCaller,
    CancelNotPermitted,
    ScorerPolicyViolation,
    // Lifecycle
    MatchNotScheduled,
    MatchNotLive,
    MatchAlreadyFinished,
    NoFurtherInnings,
    InvalidWinner,
    // Delivery invariants
    InningsCompleted,
    WicketLimitExceeded,
    InvalidEventShape,
    NothingToUndo,
    InvalidOperation,
    InternalError,
    // Storage errors
    StorageFull,
    StorageCorrupted,
    SystemBusy,
}

impl CommandErrorCode {
    /// Security-relevant rejections (wrong captain, self-approval, rights not held)
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            CommandErrorCode::NotACaptainOfEitherTeam
                | CommandErrorCode::InvalidApprover
                | CommandErrorCode::RightsNotHeldByCaller
                | CommandErrorCode::CancelNotPermitted
                | CommandErrorCode::ScorerPolicyViolation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_count_rolls_at_six() {
        let mut overs = OverCount::default();
        for _ in 0..5 {
            overs = overs.advance();
        }
        assert_eq!(overs, OverCount::new(0, 5));
        overs = overs.advance();
        assert_eq!(overs, OverCount::new(1, 0));
        assert_eq!(overs.to_string(), "1.0");
    }

    #[test]
    fn test_over_count_conversions() {
        let overs = OverCount::from_balls(20);
        assert_eq!(overs.completed_overs, 3);
        assert_eq!(overs.balls_in_current_over, 2);
        assert_eq!(overs.total_balls(), 20);
        assert_eq!(overs.to_string(), "3.2");
        assert!((overs.as_fractional_overs() - 20.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ten_balls_is_not_point_ten() {
        // 10 legal balls is 1.4, never 0.10
        assert_eq!(OverCount::from_balls(10).to_string(), "1.4");
    }

    #[test]
    fn test_legal_delivery_classification() {
        assert!(ExtraKind::None.is_legal_delivery());
        assert!(ExtraKind::Bye.is_legal_delivery());
        assert!(ExtraKind::LegBye.is_legal_delivery());
        assert!(!ExtraKind::Wide.is_legal_delivery());
        assert!(!ExtraKind::NoBall.is_legal_delivery());
    }

    #[test]
    fn test_rights_grant_view() {
        assert!(ScoringRights::Unclaimed.grant().is_none());

        let requested = ScoringRights::Requested {
            requesting_captain_id: "cap-a".to_string(),
            requested_at: 10,
        };
        let grant = requested.grant().unwrap();
        assert_eq!(grant.requesting_captain_id, "cap-a");
        assert!(grant.approving_captain_id.is_none());
        assert_eq!(requested.holder(), None);
        assert_eq!(requested.pending_requester(), Some("cap-a"));

        let approved = ScoringRights::Approved {
            requesting_captain_id: "cap-a".to_string(),
            approving_captain_id: "cap-b".to_string(),
            requested_at: 10,
            granted_at: 20,
        };
        assert_eq!(approved.holder(), Some("cap-a"));
        assert_eq!(
            approved.grant().unwrap().approving_captain_id.as_deref(),
            Some("cap-b")
        );
    }

    #[test]
    fn test_rights_serialize_tagged() {
        let json = serde_json::to_value(ScoringRights::Requested {
            requesting_captain_id: "cap-a".to_string(),
            requested_at: 1,
        })
        .unwrap();
        assert_eq!(json["state"], "REQUESTED");
        assert_eq!(json["requesting_captain_id"], "cap-a");
    }

    #[test]
    fn test_authorization_codes() {
        assert!(CommandErrorCode::InvalidApprover.is_authorization());
        assert!(CommandErrorCode::RightsNotHeldByCaller.is_authorization());
        assert!(!CommandErrorCode::NothingToUndo.is_authorization());
    }
}
