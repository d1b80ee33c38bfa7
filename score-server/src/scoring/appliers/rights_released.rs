//! RightsReleased event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, ScoringRights};

/// RightsReleased applier
pub struct RightsReleasedApplier;

impl EventApplier for RightsReleasedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::RightsReleased {
            released_at,
            reason,
        } = &event.payload
        {
            snapshot.rights = ScoringRights::Released {
                released_at: *released_at,
                reason: *reason,
            };

            super::finish(snapshot, event);
        }
    }
}
