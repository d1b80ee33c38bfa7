//! MatchStarted event applier

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, Innings, MatchEvent, MatchSnapshot, MatchStatus};

/// MatchStarted applier - goes Live and opens innings #1
pub struct MatchStartedApplier;

impl EventApplier for MatchStartedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::MatchStarted { batting_team_id } = &event.payload {
            snapshot.status = MatchStatus::Live;
            snapshot.innings = vec![Innings::new(1, batting_team_id.clone())];

            super::finish(snapshot, event);
        }
    }
}
