//! Match events - immutable facts recorded after command processing

use super::snapshot::Innings;
use super::types::{BallEvent, CancelReason, ReleaseReason, TeamSide};
use serde::{Deserialize, Serialize};

/// Match event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    /// Event unique ID
    pub event_id: String,
    /// Per-match version (AUTHORITATIVE ordering for state evolution)
    pub version: u64,
    /// Match this event belongs to
    pub match_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event
    pub command_id: String,
    pub event_type: MatchEventType,
    pub payload: EventPayload,
}

impl MatchEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u64,
        match_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: MatchEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            version,
            match_id,
            timestamp: crate::util::now_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchEventType {
    // Lifecycle
    MatchScheduled,
    MatchStarted,
    InningsStarted,
    MatchCompleted,
    MatchAbandoned,

    // Scoring rights
    RightsRequested,
    RightsApproved,
    RightsRequestCancelled,
    RightsReleased,

    // Deliveries
    BallRecorded,
    BallUndone,
}

impl std::fmt::Display for MatchEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchEventType::MatchScheduled => write!(f, "MATCH_SCHEDULED"),
            MatchEventType::MatchStarted => write!(f, "MATCH_STARTED"),
            MatchEventType::InningsStarted => write!(f, "INNINGS_STARTED"),
            MatchEventType::MatchCompleted => write!(f, "MATCH_COMPLETED"),
            MatchEventType::MatchAbandoned => write!(f, "MATCH_ABANDONED"),
            MatchEventType::RightsRequested => write!(f, "RIGHTS_REQUESTED"),
            MatchEventType::RightsApproved => write!(f, "RIGHTS_APPROVED"),
            MatchEventType::RightsRequestCancelled => write!(f, "RIGHTS_REQUEST_CANCELLED"),
            MatchEventType::RightsReleased => write!(f, "RIGHTS_RELEASED"),
            MatchEventType::BallRecorded => write!(f, "BALL_RECORDED"),
            MatchEventType::BallUndone => write!(f, "BALL_UNDONE"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    MatchScheduled {
        team_a: TeamSide,
        team_b: TeamSide,
        #[serde(skip_serializing_if = "Option::is_none")]
        tournament_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        venue: Option<String>,
        scheduled_at: i64,
    },

    /// Match went live and innings #1 opened
    MatchStarted { batting_team_id: String },

    /// Previous innings closed, the next one opened
    InningsStarted {
        closed_innings_number: u32,
        innings_number: u32,
        batting_team_id: String,
    },

    MatchCompleted { winning_team_id: String },

    MatchAbandoned {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Scoring Rights ==========
    RightsRequested {
        requesting_captain_id: String,
        requested_at: i64,
    },

    RightsApproved {
        approving_captain_id: String,
        granted_at: i64,
    },

    RightsRequestCancelled {
        requesting_captain_id: String,
        reason: CancelReason,
    },

    RightsReleased {
        released_at: i64,
        reason: ReleaseReason,
    },

    // ========== Deliveries ==========
    BallRecorded { innings_number: u32, ball: BallEvent },

    /// Most recent delivery removed; `innings` is the replayed projection
    BallUndone {
        innings_number: u32,
        removed: BallEvent,
        innings: Innings,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> MatchEventType {
        match self {
            EventPayload::MatchScheduled { .. } => MatchEventType::MatchScheduled,
            EventPayload::MatchStarted { .. } => MatchEventType::MatchStarted,
            EventPayload::InningsStarted { .. } => MatchEventType::InningsStarted,
            EventPayload::MatchCompleted { .. } => MatchEventType::MatchCompleted,
            EventPayload::MatchAbandoned { .. } => MatchEventType::MatchAbandoned,
            EventPayload::RightsRequested { .. } => MatchEventType::RightsRequested,
            EventPayload::RightsApproved { .. } => MatchEventType::RightsApproved,
            EventPayload::RightsRequestCancelled { .. } => MatchEventType::RightsRequestCancelled,
            EventPayload::RightsReleased { .. } => MatchEventType::RightsReleased,
            EventPayload::BallRecorded { .. } => MatchEventType::BallRecorded,
            EventPayload::BallUndone { .. } => MatchEventType::BallUndone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::types::ExtraKind;

    #[test]
    fn test_payload_serializes_with_type_tag() {
        let payload = EventPayload::BallRecorded {
            innings_number: 1,
            ball: BallEvent {
                sequence_number: 3,
                runs_off_bat: 0,
                extra_kind: ExtraKind::Wide,
                is_wicket: false,
                is_legal_delivery: false,
                recorded_at: 0,
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "BALL_RECORDED");
        assert_eq!(json["ball"]["extra_kind"], "WIDE");

        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), MatchEventType::BallRecorded);
    }

    #[test]
    fn test_event_type_display_matches_serde() {
        let json = serde_json::to_value(MatchEventType::RightsRequestCancelled).unwrap();
        assert_eq!(
            json.as_str().unwrap(),
            MatchEventType::RightsRequestCancelled.to_string()
        );
    }
}
