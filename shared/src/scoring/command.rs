//! Match commands - requests from clients to change match state

use super::types::{BallInput, OperatorRole, TeamSide};
use serde::{Deserialize, Serialize};

/// Match command envelope
///
/// `command_id` doubles as the idempotency key: re-sending the same command
/// (at-least-once delivery from a flaky client) has no further effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCommand {
    pub command_id: String,
    /// Caller identity as asserted by the host's auth layer
    pub operator_id: String,
    pub operator_name: String,
    #[serde(default)]
    pub role: OperatorRole,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: MatchCommandPayload,
}

impl MatchCommand {
    pub fn new(
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
        payload: MatchCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            role: OperatorRole::Captain,
            timestamp: crate::util::now_millis(),
            payload,
        }
    }

    pub fn with_role(mut self, role: OperatorRole) -> Self {
        self.role = role;
        self
    }

    /// Target match (None for ScheduleMatch, which creates one)
    pub fn match_id(&self) -> Option<&str> {
        self.payload.match_id()
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchCommandPayload {
    // ========== Lifecycle ==========
    ScheduleMatch {
        team_a: TeamSide,
        team_b: TeamSide,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tournament_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        venue: Option<String>,
        scheduled_at: i64,
    },
    StartMatch {
        match_id: String,
        /// Toss result; defaults to team A
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batting_team_id: Option<String>,
    },
    StartNextInnings {
        match_id: String,
    },
    CompleteMatch {
        match_id: String,
        winning_team_id: String,
    },
    AbandonMatch {
        match_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Scoring Rights ==========
    RequestScoringRights {
        match_id: String,
    },
    ApproveScoringRights {
        match_id: String,
    },
    CancelRightsRequest {
        match_id: String,
    },
    ReleaseScoringRights {
        match_id: String,
    },

    // ========== Deliveries ==========
    ApplyBallEvent {
        match_id: String,
        ball: BallInput,
    },
    UndoLastEvent {
        match_id: String,
    },
}

impl MatchCommandPayload {
    pub fn match_id(&self) -> Option<&str> {
        match self {
            MatchCommandPayload::ScheduleMatch { .. } => None,
            MatchCommandPayload::StartMatch { match_id, .. }
            | MatchCommandPayload::StartNextInnings { match_id }
            | MatchCommandPayload::CompleteMatch { match_id, .. }
            | MatchCommandPayload::AbandonMatch { match_id, .. }
            | MatchCommandPayload::RequestScoringRights { match_id }
            | MatchCommandPayload::ApproveScoringRights { match_id }
            | MatchCommandPayload::CancelRightsRequest { match_id }
            | MatchCommandPayload::ReleaseScoringRights { match_id }
            | MatchCommandPayload::ApplyBallEvent { match_id, .. }
            | MatchCommandPayload::UndoLastEvent { match_id } => Some(match_id),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            MatchCommandPayload::ScheduleMatch { .. } => "ScheduleMatch",
            MatchCommandPayload::StartMatch { .. } => "StartMatch",
            MatchCommandPayload::StartNextInnings { .. } => "StartNextInnings",
            MatchCommandPayload::CompleteMatch { .. } => "CompleteMatch",
            MatchCommandPayload::AbandonMatch { .. } => "AbandonMatch",
            MatchCommandPayload::RequestScoringRights { .. } => "RequestScoringRights",
            MatchCommandPayload::ApproveScoringRights { .. } => "ApproveScoringRights",
            MatchCommandPayload::CancelRightsRequest { .. } => "CancelRightsRequest",
            MatchCommandPayload::ReleaseScoringRights { .. } => "ReleaseScoringRights",
            MatchCommandPayload::ApplyBallEvent { .. } => "ApplyBallEvent",
            MatchCommandPayload::UndoLastEvent { .. } => "UndoLastEvent",
        }
    }
}
