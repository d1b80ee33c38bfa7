//! ApplyBallEvent command handler
//!
//! Records one delivery for the current innings. The delivery is validated by
//! running it through the over engine before it is appended to the log; the
//! BallRecorded applier then folds it into the snapshot.

use crate::scoring::overs;
use crate::scoring::rights;
use crate::scoring::lifecycle;
use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{BallEvent, BallInput, EventPayload, MatchEvent};

/// ApplyBallEvent action
#[derive(Debug, Clone)]
pub struct ApplyBallAction {
    pub match_id: String,
    pub ball: BallInput,
}

impl CommandHandler for ApplyBallAction {
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

        let sequence = ctx.next_delivery_sequence(innings.innings_number)?;
        let ball = BallEvent::from_input(sequence, &self.ball, ctx.now());
        let updated = overs::apply_delivery(innings, &ball)?;

        ctx.record_delivery(innings.innings_number, &ball)?;

        tracing::debug!(
            match_id = %self.match_id,
            innings = innings.innings_number,
            sequence,
            score = %updated.score_line(),
            "Delivery recorded"
        );

        let event = ctx.event(
            metadata,
            EventPayload::BallRecorded {
                innings_number: innings.innings_number,
                ball,
            },
        );
        Ok(vec![event])
    }
}
