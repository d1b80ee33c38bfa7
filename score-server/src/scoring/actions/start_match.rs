//! StartMatch command handler
//!
//! Scheduled → Live. Requires an approved scoring grant; opens innings #1 for
//! the toss winner's choice (team A when not given).

use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent};

/// StartMatch action
#[derive(Debug, Clone)]
pub struct StartMatchAction {
    pub match_id: String,
    pub batting_team_id: Option<String>,
}

impl CommandHandler for StartMatchAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        let batting_team_id = lifecycle::check_start(&snapshot, self.batting_team_id.as_deref())?;

        let event = ctx.event(metadata, EventPayload::MatchStarted { batting_team_id });
        Ok(vec![event])
    }
}
