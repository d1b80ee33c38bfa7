//! InningsStarted event applier
//!
//! Closes the finished innings and opens the next one with zero totals.

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, Innings, MatchEvent, MatchSnapshot};

/// InningsStarted applier
pub struct InningsStartedApplier;

impl EventApplier for InningsStartedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::InningsStarted {
            closed_innings_number,
            innings_number,
            batting_team_id,
        } = &event.payload
        {
            if let Some(closed) = snapshot.innings_mut(*closed_innings_number) {
                closed.is_completed = true;
            }
            snapshot
                .innings
                .push(Innings::new(*innings_number, batting_team_id.clone()));

            super::finish(snapshot, event);
        }
    }
}
