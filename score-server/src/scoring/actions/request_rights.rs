//! RequestScoringRights command handler
//!
//! The caller asks to become the match scorer. A repeat request from the
//! captain already waiting produces no events.

use crate::scoring::rights::{self, RequestOutcome};
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent};

/// RequestScoringRights action
#[derive(Debug, Clone)]
pub struct RequestRightsAction {
    pub match_id: String,
}

impl CommandHandler for RequestRightsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;

        match rights::check_request(&snapshot, &metadata.operator_id)? {
            RequestOutcome::AlreadyPending => {
                tracing::debug!(
                    match_id = %self.match_id,
                    captain_id = %metadata.operator_id,
                    "Rights already requested by caller, no-op"
                );
                Ok(vec![])
            }
            RequestOutcome::Open => {
                let requested_at = ctx.now();
                let event = ctx.event(
                    metadata,
                    EventPayload::RightsRequested {
                        requesting_captain_id: metadata.operator_id.clone(),
                        requested_at,
                    },
                );
                Ok(vec![event])
            }
        }
    }
}
