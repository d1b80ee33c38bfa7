//! ApproveScoringRights command handler
//!
//! The opposing captain confirms the pending request. Self-approval is
//! rejected.

use crate::scoring::rights;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent};

/// ApproveScoringRights action
#[derive(Debug, Clone)]
pub struct ApproveRightsAction {
    pub match_id: String,
}

impl CommandHandler for ApproveRightsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        let requester = rights::check_approve(&snapshot, &metadata.operator_id)?;

        tracing::debug!(
            match_id = %self.match_id,
            requester = %requester,
            approver = %metadata.operator_id,
            "Approving scoring rights"
        );

        let granted_at = ctx.now();
        let event = ctx.event(
            metadata,
            EventPayload::RightsApproved {
                approving_captain_id: metadata.operator_id.clone(),
                granted_at,
            },
        );
        Ok(vec![event])
    }
}
