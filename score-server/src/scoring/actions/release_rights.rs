//! ReleaseScoringRights command handler

use crate::scoring::rights;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent, ReleaseReason};

/// ReleaseScoringRights action (explicit release by holder or admin)
#[derive(Debug, Clone)]
pub struct ReleaseRightsAction {
    pub match_id: String,
}

impl CommandHandler for ReleaseRightsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        rights::check_release(&snapshot, metadata)?;

        let released_at = ctx.now();
        let event = ctx.event(
            metadata,
            EventPayload::RightsReleased {
                released_at,
                reason: ReleaseReason::Explicit,
            },
        );
        Ok(vec![event])
    }
}
