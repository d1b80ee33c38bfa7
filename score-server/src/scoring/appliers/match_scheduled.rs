//! MatchScheduled event applier
//!
//! Fills the empty match shell with teams and schedule.

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot, MatchStatus};

/// MatchScheduled applier
pub struct MatchScheduledApplier;

impl EventApplier for MatchScheduledApplier {
    fn apply(&self, snapshot: &mut MatchSnapshot, event: &MatchEvent) {
        if let EventPayload::MatchScheduled {
            team_a,
            team_b,
            tournament_id,
            venue,
            scheduled_at,
        } = &event.payload
        {
            snapshot.team_a = team_a.clone();
            snapshot.team_b = team_b.clone();
            snapshot.tournament_id = tournament_id.clone();
            snapshot.venue = venue.clone();
            snapshot.scheduled_at = *scheduled_at;
            snapshot.status = MatchStatus::Scheduled;
            snapshot.created_at = event.timestamp;

            super::finish(snapshot, event);
        }
    }
}
