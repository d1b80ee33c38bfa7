//! MatchCompleted event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, MatchStatus};

/// MatchCompleted applier - records the winner and closes every innings
pub struct MatchCompletedApplier;

impl EventApplier for MatchCompletedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::MatchCompleted { winning_team_id } = &event.payload {
            snapshot.status = MatchStatus::Completed;
            snapshot.winning_team_id = Some(winning_team_id.clone());
            for innings in &mut snapshot.innings {
                innings.is_completed = true;
            }

            super::finish(snapshot, event);
        }
    }
}
