//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use crate::scoring::traits::{CommandContext, CommandHandler, CommandMetadata, MatchError};
use shared::scoring::{MatchCommand, MatchCommandPayload, MatchEvent};

mod abandon_match;
mod apply_ball;
mod approve_rights;
mod cancel_request;
mod complete_match;
mod release_rights;
mod request_rights;
mod schedule_match;
mod start_match;
mod start_next_innings;
mod undo_ball;

pub use abandon_match::AbandonMatchAction;
pub use apply_ball::ApplyBallAction;
pub use approve_rights::ApproveRightsAction;
pub use cancel_request::CancelRequestAction;
pub use complete_match::CompleteMatchAction;
pub use release_rights::ReleaseRightsAction;
pub use request_rights::RequestRightsAction;
pub use schedule_match::ScheduleMatchAction;
pub use start_match::StartMatchAction;
pub use start_next_innings::StartNextInningsAction;
pub use undo_ball::UndoBallAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    ScheduleMatch(ScheduleMatchAction),
    StartMatch(StartMatchAction),
    StartNextInnings(StartNextInningsAction),
    CompleteMatch(CompleteMatchAction),
    AbandonMatch(AbandonMatchAction),
    RequestRights(RequestRightsAction),
    ApproveRights(ApproveRightsAction),
    CancelRequest(CancelRequestAction),
    ReleaseRights(ReleaseRightsAction),
    ApplyBall(ApplyBallAction),
    UndoBall(UndoBallAction),
}

impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        match self {
            CommandAction::ScheduleMatch(action) => action.execute(ctx, metadata),
            CommandAction::StartMatch(action) => action.execute(ctx, metadata),
            CommandAction::StartNextInnings(action) => action.execute(ctx, metadata),
            CommandAction::CompleteMatch(action) => action.execute(ctx, metadata),
            CommandAction::AbandonMatch(action) => action.execute(ctx, metadata),
            CommandAction::RequestRights(action) => action.execute(ctx, metadata),
            CommandAction::ApproveRights(action) => action.execute(ctx, metadata),
            CommandAction::CancelRequest(action) => action.execute(ctx, metadata),
            CommandAction::ReleaseRights(action) => action.execute(ctx, metadata),
            CommandAction::ApplyBall(action) => action.execute(ctx, metadata),
            CommandAction::UndoBall(action) => action.execute(ctx, metadata),
        }
    }
}

impl CommandAction {
    /// Build the action for a command
    ///
    /// `match_id` is the command's target, or the server-assigned id for
    /// `ScheduleMatch`. This is the ONLY place with a match on MatchCommandPayload.
    pub fn new(cmd: &MatchCommand, match_id: String) -> Self {
        match &cmd.payload {
            MatchCommandPayload::ScheduleMatch {
                team_a,
                team_b,
                tournament_id,
                venue,
                scheduled_at,
            } => CommandAction::ScheduleMatch(ScheduleMatchAction {
                match_id,
                team_a: team_a.clone(),
                team_b: team_b.clone(),
                tournament_id: tournament_id.clone(),
                venue: venue.clone(),
                scheduled_at: *scheduled_at,
            }),
            MatchCommandPayload::StartMatch {
                batting_team_id, ..
            } => CommandAction::StartMatch(StartMatchAction {
                match_id,
                batting_team_id: batting_team_id.clone(),
            }),
            MatchCommandPayload::StartNextInnings { .. } => {
                CommandAction::StartNextInnings(StartNextInningsAction { match_id })
            }
            MatchCommandPayload::CompleteMatch {
                winning_team_id, ..
            } => CommandAction::CompleteMatch(CompleteMatchAction {
                match_id,
                winning_team_id: winning_team_id.clone(),
            }),
            MatchCommandPayload::AbandonMatch { reason, .. } => {
                CommandAction::AbandonMatch(AbandonMatchAction {
                    match_id,
                    reason: reason.clone(),
                })
            }
            MatchCommandPayload::RequestScoringRights { .. } => {
                CommandAction::RequestRights(RequestRightsAction { match_id })
            }
            MatchCommandPayload::ApproveScoringRights { .. } => {
                CommandAction::ApproveRights(ApproveRightsAction { match_id })
            }
            MatchCommandPayload::CancelRightsRequest { .. } => {
                CommandAction::CancelRequest(CancelRequestAction { match_id })
            }
            MatchCommandPayload::ReleaseScoringRights { .. } => {
                CommandAction::ReleaseRights(ReleaseRightsAction { match_id })
            }
            MatchCommandPayload::ApplyBallEvent { ball, .. } => {
                CommandAction::ApplyBall(ApplyBallAction {
                    match_id,
                    ball: *ball,
                })
            }
            MatchCommandPayload::UndoLastEvent { .. } => {
                CommandAction::UndoBall(UndoBallAction { match_id })
            }
        }
    }
}

impl From<&MatchCommand> for CommandMetadata {
    fn from(cmd: &MatchCommand) -> Self {
        CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            role: cmd.role,
            timestamp: cmd.timestamp,
        }
    }
}
