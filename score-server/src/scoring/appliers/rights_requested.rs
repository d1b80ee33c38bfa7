//! RightsRequested event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, ScoringRights};

/// RightsRequested applier
pub struct RightsRequestedApplier;

impl EventApplier for RightsRequestedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::RightsRequested {
            requesting_captain_id,
            requested_at,
        } = &event.payload
        {
            snapshot.rights = ScoringRights::Requested {
                requesting_captain_id: requesting_captain_id.clone(),
                requested_at: *requested_at,
            };

            super::finish(snapshot, event);
        }
    }
}
