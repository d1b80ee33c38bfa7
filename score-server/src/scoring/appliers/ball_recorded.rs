//! BallRecorded event applier
//!
//! Folds one delivery into the innings totals through the over accounting
//! engine, so live application and replay share the same arithmetic.

use crate::scoring::overs;
use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot};

/// BallRecorded applier
pub struct BallRecordedApplier;

impl EventApplier for BallRecordedApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::BallRecorded {
            innings_number,
            ball,
        } = &event.payload
        {
            let Some(innings) = snapshot.innings_mut(*innings_number) else {
                tracing::error!(
                    match_id = %event.match_id,
                    innings = innings_number,
                    "BallRecorded for unknown innings"
                );
                return;
            };

            match overs::apply_delivery(innings, ball) {
                Ok(updated) => *innings = updated,
                Err(e) => {
                    // Handler validated the same delivery, so this only fires on a corrupt stream
                    tracing::error!(
                        match_id = %event.match_id,
                        version = event.version,
                        error = %e,
                        "Failed to apply recorded delivery"
                    );
                    return;
                }
            }

            super::finish(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::appliers::fixtures::event;
    use shared::scoring::{BallEvent, BallInput, ExtraKind, Innings, OverCount};

    fn ball_event(version: u64, input: BallInput) -> MatchEvent {
        event(
            version,
            EventPayload::BallRecorded {
                innings_number: 1,
                ball: BallEvent::from_input(version, &input, 0),
            },
        )
    }

    fn live_snapshot() -> MatchSnapshot {
        let mut snapshot = MatchSnapshot::new("m-1".to_string());
        snapshot.innings.push(Innings::new(1, "A"));
        snapshot
    }

    #[test]
    fn test_apply_runs() {
        let mut snapshot = live_snapshot();

        BallRecordedApplier.apply(&mut snapshot, &ball_event(5, BallInput::runs(4)));

        let innings = &snapshot.innings[0];
        assert_eq!(innings.total_runs, 4);
        assert_eq!(innings.total_overs, OverCount::new(0, 1));
        assert_eq!(snapshot.version, 5);
        assert!(snapshot.verify_checksum());
    }

    #[test]
    fn test_apply_wide_keeps_ball_count() {
        let mut snapshot = live_snapshot();

        BallRecordedApplier.apply(
            &mut snapshot,
            &ball_event(5, BallInput::extra(ExtraKind::Wide, 0)),
        );

        let innings = &snapshot.innings[0];
        assert_eq!(innings.total_runs, 1);
        assert_eq!(innings.extras, 1);
        assert_eq!(innings.total_overs, OverCount::default());
    }

    #[test]
    fn test_apply_unknown_innings_is_ignored() {
        let mut snapshot = MatchSnapshot::new("m-1".to_string());

        BallRecordedApplier.apply(&mut snapshot, &ball_event(5, BallInput::runs(1)));

        assert!(snapshot.innings.is_empty());
        assert_eq!(snapshot.version, 0);
    }
}
