//! Match lifecycle guards
//!
//! `Scheduled → Live → {Completed, Abandoned}`; both end states are terminal.

use shared::scoring::{MatchSnapshot, MatchStatus, TeamSide};

use super::traits::MatchError;

/// Teams of a new match must be distinct, and so must their captains
pub fn check_teams(team_a: &TeamSide, team_b: &TeamSide) -> Result<(), MatchError> {
    if team_a.team_id.trim().is_empty() || team_b.team_id.trim().is_empty() {
        return Err(MatchError::InvalidOperation(
            "team_id must not be empty".to_string(),
        ));
    }
    if team_a.team_id == team_b.team_id {
        return Err(MatchError::InvalidOperation(format!(
            "a team cannot play itself: {}",
            team_a.team_id
        )));
    }
    if team_a.captain_id == team_b.captain_id {
        return Err(MatchError::InvalidOperation(format!(
            "{} cannot captain both teams",
            team_a.captain_id
        )));
    }
    Ok(())
}

/// StartMatch: Scheduled with an approved grant; returns the team batting first
pub fn check_start(
    snapshot: &MatchSnapshot,
    batting_team_id: Option<&str>,
) -> Result<String, MatchError> {
    if snapshot.status != MatchStatus::Scheduled {
        return Err(MatchError::MatchNotScheduled(snapshot.status));
    }
    if !snapshot.rights.is_approved() {
        return Err(MatchError::RightsNotApproved(snapshot.rights.state_name()));
    }

    match batting_team_id {
        None => Ok(snapshot.team_a.team_id.clone()),
        Some(id) if snapshot.is_competing_team(id) => Ok(id.to_string()),
        Some(id) => Err(MatchError::InvalidOperation(format!(
            "{id} is not a competing team"
        ))),
    }
}

pub fn check_live(snapshot: &MatchSnapshot) -> Result<(), MatchError> {
    if snapshot.status != MatchStatus::Live {
        return Err(MatchError::MatchNotLive(snapshot.status));
    }
    Ok(())
}

/// CompleteMatch: Live and the winner is one of the two teams
pub fn check_complete(snapshot: &MatchSnapshot, winning_team_id: &str) -> Result<(), MatchError> {
    check_live(snapshot)?;
    if !snapshot.is_competing_team(winning_team_id) {
        return Err(MatchError::InvalidWinner(winning_team_id.to_string()));
    }
    Ok(())
}

/// AbandonMatch: from Scheduled or Live
pub fn check_abandon(snapshot: &MatchSnapshot) -> Result<(), MatchError> {
    if snapshot.is_terminal() {
        return Err(MatchError::MatchAlreadyFinished(snapshot.status));
    }
    Ok(())
}

/// StartNextInnings: Live with exactly one innings; returns `(closing, next batting team)`
pub fn check_next_innings(snapshot: &MatchSnapshot) -> Result<(u32, String), MatchError> {
    check_live(snapshot)?;
    let [first] = snapshot.innings.as_slice() else {
        return Err(MatchError::NoFurtherInnings(snapshot.innings.len()));
    };
    let next_batting = snapshot
        .opponent_of(&first.batting_team_id)
        .map(|t| t.team_id.clone())
        .ok_or_else(|| {
            MatchError::InvalidOperation(format!(
                "batting team {} is not a competing team",
                first.batting_team_id
            ))
        })?;
    Ok((first.innings_number, next_batting))
}
