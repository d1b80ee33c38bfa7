//! RightsRequestCancelled event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, ScoringRights};

/// RightsRequestCancelled applier - pending request goes back to Unclaimed
pub struct RightsRequestCancelledApplier;

impl EventApplier for RightsRequestCancelledApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::RightsRequestCancelled { .. } = &event.payload {
            snapshot.rights = ScoringRights::Unclaimed;

            super::finish(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::appliers::fixtures::event;
    use shared::scoring::CancelReason;

    #[test]
    fn test_apply_clears_request() {
        let mut snapshot = MatchSnapshot::new("m-1".to_string());
        snapshot.rights = ScoringRights::Requested {
            requesting_captain_id: "cap-a".to_string(),
            requested_at: 1000,
        };
        let e = event(
            3,
            EventPayload::RightsRequestCancelled {
                requesting_captain_id: "cap-a".to_string(),
                reason: CancelReason::Expired,
            },
        );

        RightsRequestCancelledApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.rights, ScoringRights::Unclaimed);
        assert!(snapshot.rights.grant().is_none());
    }
}
