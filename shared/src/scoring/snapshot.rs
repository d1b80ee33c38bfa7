//! Match snapshot - computed state from the match event stream
//!
//! The snapshot includes a `state_checksum` field for drift detection.
//! Clients can compare their locally computed checksum with the server's
//! to detect if their cached view has diverged.

use super::types::{OverCount, ScoringRights, TeamSide};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Match status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Abandoned,
}

impl MatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Abandoned)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "SCHEDULED"),
            MatchStatus::Live => write!(f, "LIVE"),
            MatchStatus::Completed => write!(f, "COMPLETED"),
            MatchStatus::Abandoned => write!(f, "ABANDONED"),
        }
    }
}

/// One team's turn at batting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Innings {
    /// 1-based
    pub innings_number: u32,
    pub batting_team_id: String,
    pub total_runs: u32,
    pub total_wickets: u8,
    pub total_overs: OverCount,
    pub extras: u32,
    pub is_completed: bool,
}

impl Innings {
    /// Empty innings (zero totals)
    pub fn new(innings_number: u32, batting_team_id: impl Into<String>) -> Self {
        Self {
            innings_number,
            batting_team_id: batting_team_id.into(),
            total_runs: 0,
            total_wickets: 0,
            total_overs: OverCount::default(),
            extras: 0,
            is_completed: false,
        }
    }

    /// Same innings identity with zero totals (replay starting point)
    pub fn emptied(&self) -> Self {
        Self::new(self.innings_number, self.batting_team_id.clone())
    }

    /// Scoreboard line, e.g. `7/1 (0.3)`
    pub fn score_line(&self) -> String {
        format!(
            "{}/{} ({})",
            self.total_runs, self.total_wickets, self.total_overs
        )
    }
}

/// Match snapshot - computed from the match event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    /// Match ID (assigned by server)
    pub match_id: String,
    pub team_a: TeamSide,
    pub team_b: TeamSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    /// Scheduled start (Unix milliseconds)
    pub scheduled_at: i64,
    pub status: MatchStatus,
    pub rights: ScoringRights,
    /// One or two innings, in batting order
    pub innings: Vec<Innings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abandon_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Version of the last applied event (per-match, monotonically increasing)
    pub version: u64,
    /// State checksum for drift detection (hex string)
    #[serde(default)]
    pub state_checksum: String,
}

impl MatchSnapshot {
    /// Create an empty match shell (filled by the MatchScheduled applier)
    pub fn new(match_id: String) -> Self {
        let mut snapshot = Self {
            match_id,
            team_a: TeamSide {
                team_id: String::new(),
                name: String::new(),
                captain_id: String::new(),
            },
            team_b: TeamSide {
                team_id: String::new(),
                name: String::new(),
                captain_id: String::new(),
            },
            tournament_id: None,
            venue: None,
            scheduled_at: 0,
            status: MatchStatus::Scheduled,
            rights: ScoringRights::Unclaimed,
            innings: Vec::new(),
            winning_team_id: None,
            abandon_reason: None,
            created_at: 0,
            updated_at: 0,
            version: 0,
            state_checksum: String::new(),
        };
        snapshot.update_checksum();
        snapshot
    }

    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Innings currently being (or last) played
    pub fn current_innings(&self) -> Option<&Innings> {
        self.innings.last()
    }

    pub fn current_innings_mut(&mut self) -> Option<&mut Innings> {
        self.innings.last_mut()
    }

    pub fn innings_mut(&mut self, innings_number: u32) -> Option<&mut Innings> {
        self.innings
            .iter_mut()
            .find(|i| i.innings_number == innings_number)
    }

    pub fn team(&self, team_id: &str) -> Option<&TeamSide> {
        [&self.team_a, &self.team_b]
            .into_iter()
            .find(|t| t.team_id == team_id)
    }

    pub fn is_competing_team(&self, team_id: &str) -> bool {
        self.team(team_id).is_some()
    }

    /// Team captained by `captain_id`, if any
    pub fn team_of_captain(&self, captain_id: &str) -> Option<&TeamSide> {
        [&self.team_a, &self.team_b]
            .into_iter()
            .find(|t| t.captain_id == captain_id)
    }

    /// The team opposing `team_id`
    pub fn opponent_of(&self, team_id: &str) -> Option<&TeamSide> {
        if self.team_a.team_id == team_id {
            Some(&self.team_b)
        } else if self.team_b.team_id == team_id {
            Some(&self.team_a)
        } else {
            None
        }
    }

    /// Compute state checksum for drift detection
    ///
    /// Fields included: version, status, rights state, and per-innings totals.
    /// Returns a 16-character hex string.
    pub fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher as _;

        let mut hasher = DefaultHasher::new();
        self.version.hash(&mut hasher);
        (self.status as u8).hash(&mut hasher);
        self.rights.state_name().hash(&mut hasher);
        self.rights.holder().hash(&mut hasher);
        for innings in &self.innings {
            innings.hash(&mut hasher);
        }
        self.winning_team_id.hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Update the state_checksum field based on current state
    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    /// Returns true if checksum matches, false if drift detected
    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
