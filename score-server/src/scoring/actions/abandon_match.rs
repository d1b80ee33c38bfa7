//! AbandonMatch command handler
//!
//! Administrative override: Scheduled or Live → Abandoned, unconditionally.

use super::complete_match::close_rights;
use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent, ReleaseReason};

/// AbandonMatch action
#[derive(Debug, Clone)]
pub struct AbandonMatchAction {
    pub match_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for AbandonMatchAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        lifecycle::check_abandon(&snapshot)?;

        let mut events = vec![ctx.event(
            metadata,
            EventPayload::MatchAbandoned {
                reason: self.reason.clone(),
            },
        )];
        events.extend(close_rights(ctx, metadata, &snapshot, ReleaseReason::MatchAbandoned));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::actions::fixtures::{admin, scheduled_match};
    use crate::scoring::policy::ScoringRules;
    use crate::scoring::storage::MatchStorage;
    use shared::scoring::{CancelReason, MatchStatus, ScoringRights};

    #[test]
    fn test_abandon_cancels_pending_request() {
        let storage = MatchStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = scheduled_match("m-1");
        snapshot.rights = ScoringRights::Requested {
            requesting_captain_id: "cap-b".to_string(),
            requested_at: 1,
        };
        let mut ctx =
            CommandContext::new(&txn, &storage, "m-1", Some(snapshot), ScoringRules::default());

        let action = AbandonMatchAction {
            match_id: "m-1".to_string(),
            reason: Some("Rain".to_string()),
        };
        let events = action.execute(&mut ctx, &admin()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1].payload,
            EventPayload::RightsRequestCancelled {
                requesting_captain_id: "cap-b".to_string(),
                reason: CancelReason::MatchFinished,
            }
        );
    }

    #[test]
    fn test_abandon_finished_match_rejected() {
        let storage = MatchStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = scheduled_match("m-1");
        snapshot.status = MatchStatus::Completed;
        let mut ctx =
            CommandContext::new(&txn, &storage, "m-1", Some(snapshot), ScoringRules::default());

        let action = AbandonMatchAction {
            match_id: "m-1".to_string(),
            reason: None,
        };
        assert!(matches!(
            action.execute(&mut ctx, &admin()),
            Err(MatchError::MatchAlreadyFinished(MatchStatus::Completed))
        ));
    }
}
