//! RightsApproved event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, ScoringRights};

/// RightsApproved applier - promotes the pending request into an active grant
pub struct RightsApprovedApplier;

impl EventApplier for RightsApprovedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::RightsApproved {
            approving_captain_id,
            granted_at,
        } = &event.payload
        {
            let ScoringRights::Requested {
                requesting_captain_id,
                requested_at,
            } = &snapshot.rights
            else {
                tracing::error!(
                    match_id = %snapshot.match_id,
                    version = event.version,
                    state = snapshot.rights.state_name(),
                    "RightsApproved applied without a pending request"
                );
                return;
            };

            snapshot.rights = ScoringRights::Approved {
                requesting_captain_id: requesting_captain_id.clone(),
                approving_captain_id: approving_captain_id.clone(),
                requested_at: *requested_at,
                granted_at: *granted_at,
            };

            super::finish(snapshot, event);
        }
    }
}
