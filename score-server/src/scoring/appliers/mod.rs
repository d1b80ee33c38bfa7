//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use crate::scoring::traits::EventApplier;
use shared::scoring::{EventPayload, MatchEvent, MatchSnapshot};

mod ball_recorded;
mod ball_undone;
mod innings_started;
mod match_abandoned;
mod match_completed;
mod match_scheduled;
mod match_started;
mod rights_approved;
mod rights_released;
mod rights_request_cancelled;
mod rights_requested;

pub use ball_recorded::BallRecordedApplier;
pub use ball_undone::BallUndoneApplier;
pub use innings_started::InningsStartedApplier;
pub use match_abandoned::MatchAbandonedApplier;
pub use match_completed::MatchCompletedApplier;
pub use match_scheduled::MatchScheduledApplier;
pub use match_started::MatchStartedApplier;
pub use rights_approved::RightsApprovedApplier;
pub use rights_released::RightsReleasedApplier;
pub use rights_request_cancelled::RightsRequestCancelledApplier;
pub use rights_requested::RightsRequestedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    MatchScheduled(MatchScheduledApplier),
    MatchStarted(MatchStartedApplier),
    InningsStarted(InningsStartedApplier),
    MatchCompleted(MatchCompletedApplier),
    MatchAbandoned(MatchAbandonedApplier),
    RightsRequested(RightsRequestedApplier),
    RightsApproved(RightsApprovedApplier),
    RightsRequestCancelled(RightsRequestCancelledApplier),
    RightsReleased(RightsReleasedApplier),
    BallRecorded(BallRecordedApplier),
    BallUndone(BallUndoneApplier),
}

/// Convert MatchEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&MatchEvent> for EventAction {
    fn from(event: &MatchEvent) -> Self {
        match &event.payload {
            EventPayload::MatchScheduled { .. } => EventAction::MatchScheduled(MatchScheduledApplier),
            EventPayload::MatchStarted { .. } => EventAction::MatchStarted(MatchStartedApplier),
            EventPayload::InningsStarted { .. } => EventAction::InningsStarted(InningsStartedApplier),
            EventPayload::MatchCompleted { .. } => EventAction::MatchCompleted(MatchCompletedApplier),
            EventPayload::MatchAbandoned { .. } => EventAction::MatchAbandoned(MatchAbandonedApplier),
            EventPayload::RightsRequested { .. } => {
                EventAction::RightsRequested(RightsRequestedApplier)
            }
            EventPayload::RightsApproved { .. } => EventAction::RightsApproved(RightsApprovedApplier),
            EventPayload::RightsRequestCancelled { .. } => {
                EventAction::RightsRequestCancelled(RightsRequestCancelledApplier)
            }
            EventPayload::RightsReleased { .. } => EventAction::RightsReleased(RightsReleasedApplier),
            EventPayload::BallRecorded { .. } => EventAction::BallRecorded(BallRecordedApplier),
            EventPayload::BallUndone { .. } => EventAction::BallUndone(BallUndoneApplier),
        }
    }
}

/// Stamp version / timestamp / checksum after an applier mutated the snapshot
pub(crate) fn finish(snapshot: &mut MatchSnapshot, event: &MatchEvent) {
    snapshot.version = event.version;
    snapshot.updated_at = event.timestamp;
    snapshot.update_checksum();
}

/// Fold an ordered event stream into a fresh snapshot
pub fn rebuild(match_id: &str, events: &[MatchEvent]) -> MatchSnapshot {
    let mut snapshot = MatchSnapshot::new(match_id.to_string());
    for event in events {
        let applier: EventAction = event.into();
        applier.apply(&mut snapshot, event);
    }
    snapshot
}

#[cfg(test)]
pub(crate) mod fixtures {
    use shared::scoring::{EventPayload, MatchEvent};

    pub fn event(version: u64, payload: EventPayload) -> MatchEvent {
        MatchEvent::new(
            version,
            "m-1".to_string(),
            "cap-a".to_string(),
            "Alice".to_string(),
            format!("cmd-{version}"),
            Some(1234567890),
            payload.event_type(),
            payload,
        )
    }
}
