//! BallUndone event applier
//!
//! The event carries the innings recomputed by replay; the applier swaps it in.

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot};

/// BallUndone applier
pub struct BallUndoneApplier;

impl EventApplier for BallUndoneApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::BallUndone {
            innings_number,
            innings: recomputed,
            ..
        } = &event.payload
        {
            let Some(innings) = snapshot.innings_mut(*innings_number) else {
                tracing::error!(
                    match_id = %event.match_id,
                    innings = innings_number,
                    "BallUndone for unknown innings"
                );
                return;
            };
            *innings = recomputed.clone();

            super::finish(snapshot, event);
        }
    }
}
