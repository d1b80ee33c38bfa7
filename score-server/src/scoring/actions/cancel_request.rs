//! CancelRightsRequest command handler
//!
//! Withdraws a pending request back to Unclaimed. Allowed for the requester,
//! an admin, or the system expiry sweep.

use crate::scoring::rights;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent};

/// CancelRightsRequest action
#[derive(Debug, Clone)]
pub struct CancelRequestAction {
    pub match_id: String,
}

impl CommandHandler for CancelRequestAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        let (requesting_captain_id, reason) = rights::check_cancel(&snapshot, metadata)?;

        let event = ctx.event(
            metadata,
            EventPayload::RightsRequestCancelled {
                requesting_captain_id,
                reason,
            },
        );
        Ok(vec![event])
    }
}
