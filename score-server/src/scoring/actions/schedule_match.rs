//! ScheduleMatch command handler
//!
//! Registers a match handed over by the scheduling side. The match id is
//! assigned by the manager before the action runs.

use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent, TeamSide};

/// ScheduleMatch action
#[derive(Debug, Clone)]
pub struct ScheduleMatchAction {
    pub match_id: String,
    pub team_a: TeamSide,
    pub team_b: TeamSide,
    pub tournament_id: Option<String>,
    pub venue: Option<String>,
    pub scheduled_at: i64,
}

impl CommandHandler for ScheduleMatchAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        if ctx.match_exists() {
            return Err(MatchError::InvalidOperation(format!(
                "Match {} already exists",
                self.match_id
            )));
        }
        lifecycle::check_teams(&self.team_a, &self.team_b)?;

        let event = ctx.event(
            metadata,
            EventPayload::MatchScheduled {
                team_a: self.team_a.clone(),
                team_b: self.team_b.clone(),
                tournament_id: self.tournament_id.clone(),
                venue: self.venue.clone(),
                scheduled_at: self.scheduled_at,
            },
        );
        Ok(vec![event])
    }
}
