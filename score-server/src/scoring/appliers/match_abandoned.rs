//! MatchAbandoned event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, MatchStatus};

/// MatchAbandoned applier
pub struct MatchAbandonedApplier;

impl EventApplier for MatchAbandonedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::MatchAbandoned { reason } = &event.payload {
            snapshot.status = MatchStatus::Abandoned;
            snapshot.abandon_reason = reason.clone();
            // 已中止的比赛不再接受记分
            for innings in &mut snapshot.innings {
                innings.is_completed = true;
            }

            super::finish(snapshot, event);
        }
    }
}
