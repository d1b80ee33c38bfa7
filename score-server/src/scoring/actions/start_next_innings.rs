//! StartNextInnings command handler
//!
//! Closes innings #1 and opens innings #2 for the other side. With rights
//! rotation configured the grant is released in the same command, so the
//! captains negotiate again before the second innings is scored.

use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent, ReleaseReason};

/// StartNextInnings action
#[derive(Debug, Clone)]
pub struct StartNextInningsAction {
    pub match_id: String,
}

impl CommandHandler for StartNextInningsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        let (closed_innings_number, batting_team_id) = lifecycle::check_next_innings(&snapshot)?;

        if snapshot.rights.holder() != Some(metadata.operator_id.as_str()) && !metadata.is_override()
        {
            return Err(MatchError::RightsNotHeldByCaller(
                metadata.operator_id.clone(),
            ));
        }

        let mut events = vec![ctx.event(
            metadata,
            EventPayload::InningsStarted {
                closed_innings_number,
                innings_number: closed_innings_number + 1,
                batting_team_id,
            },
        )];

        if ctx.rules().rotate_rights_between_innings && snapshot.rights.is_approved() {
            let released_at = ctx.now();
            events.push(ctx.event(
                metadata,
                EventPayload::RightsReleased {
                    released_at,
                    reason: ReleaseReason::InningsChange,
                },
            ));
        }

        Ok(events)
    }
}
