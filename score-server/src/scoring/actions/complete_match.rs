//! CompleteMatch command handler
//!
//! Live → Completed. Closes every innings and releases the scoring grant in
//! the same command; a request still waiting for approval is cancelled.

use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{
    CancelReason, EventPayload, MatchEvent, MatchSnapshot, ReleaseReason, ScoringRights,
};

/// CompleteMatch action
#[derive(Debug, Clone)]
pub struct CompleteMatchAction {
    pub match_id: String,
    pub winning_team_id: String,
}

impl CommandHandler for CompleteMatchAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        lifecycle::check_complete(&snapshot, &self.winning_team_id)?;

        let mut events = vec![ctx.event(
            metadata,
            EventPayload::MatchCompleted {
                winning_team_id: self.winning_team_id.clone(),
            },
        )];
        events.extend(close_rights(ctx, metadata, &snapshot, ReleaseReason::MatchCompleted));
        Ok(events)
    }
}

/// Rights events for a match reaching a terminal state
///
/// Approved grants are released; pending requests are cancelled.
pub(super) fn close_rights(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    snapshot: &MatchSnapshot,
    reason: ReleaseReason,
) -> Option<MatchEvent> {
    match &snapshot.rights {
        ScoringRights::Approved { .. } => {
            let released_at = ctx.now();
            Some(ctx.event(
                metadata,
                EventPayload::RightsReleased {
                    released_at,
                    reason,
                },
            ))
        }
        ScoringRights::Requested {
            requesting_captain_id,
            ..
        } => Some(ctx.event(
            metadata,
            EventPayload::RightsRequestCancelled {
                requesting_captain_id: requesting_captain_id.clone(),
                reason: CancelReason::MatchFinished,
            },
        )),
        ScoringRights::Unclaimed | ScoringRights::Released { .. } => None,
    }
}
