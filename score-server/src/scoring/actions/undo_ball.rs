//! UndoLastEvent command handler
//!
//! Pops the most recent delivery of the current innings and recomputes the
//! innings by replaying the remaining log from zero. Totals are never derived
//! by subtracting the removed delivery.

use crate::scoring::lifecycle;
use crate::scoring::overs::{self, DeliveryError};
use crate::scoring::rights;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{EventPayload, MatchEvent};

/// UndoLastEvent action
#[derive(Debug, Clone)]
pub struct UndoBallAction {
    pub match_id: String,
}

impl CommandHandler for UndoBallAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        let snapshot = ctx.load_snapshot()?;
        lifecycle::check_live(&snapshot)?;
        rights::check_scorer(&snapshot, &metadata.operator_id, ctx.rules())?;

        let innings = snapshot
            .current_innings()
            .ok_or_else(|| MatchError::InvalidOperation("Live match has no innings".to_string()))?;
        if innings.is_completed {
            return Err(DeliveryError::InningsCompleted(innings.innings_number).into());
        }

        let removed = ctx
            .pop_last_delivery(innings.innings_number)?
            .ok_or(MatchError::NothingToUndo(innings.innings_number))?;
        let remaining = ctx.deliveries(innings.innings_number)?;
        let recomputed = overs::replay(innings, &remaining)?;

        tracing::debug!(
            match_id = %self.match_id,
            innings = innings.innings_number,
            removed_sequence = removed.sequence_number,
            score = %recomputed.score_line(),
            "Delivery undone"
        );

        let event = ctx.event(
            metadata,
            EventPayload::BallUndone {
                innings_number: innings.innings_number,
                removed,
                innings: recomputed,
            },
        );
        Ok(vec![event])
    }
}
