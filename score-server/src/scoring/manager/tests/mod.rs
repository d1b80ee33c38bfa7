use super::*;
use crate::scoring::policy::ScorerPolicy;
use shared::scoring::{BallInput, CommandErrorCode, Innings, MatchStatus, TeamSide};

fn create_test_manager() -> MatchesManager {
    create_manager_with_rules(ScoringRules::default())
}

fn create_manager_with_rules(rules: ScoringRules) -> MatchesManager {
    let storage = MatchStorage::open_in_memory().unwrap();
    MatchesManager::with_storage(storage, rules)
}

fn fielding_only_rules() -> ScoringRules {
    ScoringRules {
        scorer_policy: ScorerPolicy::FieldingCaptainOnly,
        rotate_rights_between_innings: false,
    }
}

fn team(id: &str, name: &str, captain: &str) -> TeamSide {
    TeamSide {
        team_id: id.to_string(),
        name: name.to_string(),
        captain_id: captain.to_string(),
    }
}

fn command(operator_id: &str, payload: MatchCommandPayload) -> MatchCommand {
    MatchCommand::new(operator_id, format!("Operator {}", operator_id), payload)
}

fn admin_command(payload: MatchCommandPayload) -> MatchCommand {
    command("admin", payload).with_role(OperatorRole::Admin)
}

// ========================================================================
// Helper: lifecycle commands
// ========================================================================

fn schedule_cmd() -> MatchCommand {
    admin_command(MatchCommandPayload::ScheduleMatch {
        team_a: team("A", "Anchors", "cap-a"),
        team_b: team("B", "Bats", "cap-b"),
        tournament_id: Some("club-cup".to_string()),
        venue: Some("Oval".to_string()),
        scheduled_at: 1_700_000_000_000,
    })
}

/// Schedule a match and return its server-assigned id
fn schedule_match(manager: &MatchesManager) -> String {
    let resp = manager.execute_command(schedule_cmd());
    assert!(resp.success, "Failed to schedule match: {:?}", resp.error);
    resp.match_id.unwrap()
}

fn start(manager: &MatchesManager, match_id: &str, batting_team_id: Option<&str>) -> CommandResponse {
    manager.execute_command(admin_command(MatchCommandPayload::StartMatch {
        match_id: match_id.to_string(),
        batting_team_id: batting_team_id.map(str::to_string),
    }))
}

fn next_innings(manager: &MatchesManager, match_id: &str, operator: &str) -> CommandResponse {
    manager.execute_command(command(
        operator,
        MatchCommandPayload::StartNextInnings {
            match_id: match_id.to_string(),
        },
    ))
}

fn complete(manager: &MatchesManager, match_id: &str, winner: &str) -> CommandResponse {
    manager.execute_command(admin_command(MatchCommandPayload::CompleteMatch {
        match_id: match_id.to_string(),
        winning_team_id: winner.to_string(),
    }))
}

fn abandon(manager: &MatchesManager, match_id: &str, reason: Option<&str>) -> CommandResponse {
    manager.execute_command(admin_command(MatchCommandPayload::AbandonMatch {
        match_id: match_id.to_string(),
        reason: reason.map(str::to_string),
    }))
}

// ========================================================================
// Helper: rights commands
// ========================================================================

fn request(manager: &MatchesManager, match_id: &str, captain: &str) -> CommandResponse {
    manager.execute_command(command(
        captain,
        MatchCommandPayload::RequestScoringRights {
            match_id: match_id.to_string(),
        },
    ))
}

fn approve(manager: &MatchesManager, match_id: &str, captain: &str) -> CommandResponse {
    manager.execute_command(command(
        captain,
        MatchCommandPayload::ApproveScoringRights {
            match_id: match_id.to_string(),
        },
    ))
}

fn cancel(
    manager: &MatchesManager,
    match_id: &str,
    operator: &str,
    role: OperatorRole,
) -> CommandResponse {
    manager.execute_command(
        command(
            operator,
            MatchCommandPayload::CancelRightsRequest {
                match_id: match_id.to_string(),
            },
        )
        .with_role(role),
    )
}

fn release(manager: &MatchesManager, match_id: &str, captain: &str) -> CommandResponse {
    manager.execute_command(command(
        captain,
        MatchCommandPayload::ReleaseScoringRights {
            match_id: match_id.to_string(),
        },
    ))
}

/// `holder` requests, the other captain approves
fn grant_rights(manager: &MatchesManager, match_id: &str, holder: &str, approver: &str) {
    let resp = request(manager, match_id, holder);
    assert!(resp.success, "request failed: {:?}", resp.error);
    let resp = approve(manager, match_id, approver);
    assert!(resp.success, "approve failed: {:?}", resp.error);
}

/// Scheduled → cap-a holds rights → Live with team A batting
fn live_match(manager: &MatchesManager) -> String {
    let match_id = schedule_match(manager);
    grant_rights(manager, &match_id, "cap-a", "cap-b");
    let resp = start(manager, &match_id, None);
    assert!(resp.success, "start failed: {:?}", resp.error);
    match_id
}

// ========================================================================
// Helper: deliveries
// ========================================================================

fn ball(manager: &MatchesManager, match_id: &str, scorer: &str, input: BallInput) -> CommandResponse {
    manager.execute_command(command(
        scorer,
        MatchCommandPayload::ApplyBallEvent {
            match_id: match_id.to_string(),
            ball: input,
        },
    ))
}

fn undo(manager: &MatchesManager, match_id: &str, scorer: &str) -> CommandResponse {
    manager.execute_command(command(
        scorer,
        MatchCommandPayload::UndoLastEvent {
            match_id: match_id.to_string(),
        },
    ))
}

fn current_innings(manager: &MatchesManager, match_id: &str) -> Innings {
    manager
        .get_snapshot(match_id)
        .unwrap()
        .current_innings()
        .cloned()
        .unwrap()
}

// ========================================================================
// Assertions
// ========================================================================

fn assert_rejected(resp: &CommandResponse, expected: CommandErrorCode) {
    assert!(!resp.success, "expected {:?}, command succeeded", expected);
    assert_eq!(resp.error_code(), Some(&expected), "error: {:?}", resp.error);
}

fn assert_status(manager: &MatchesManager, match_id: &str, expected: MatchStatus) {
    let snapshot = manager.get_snapshot(match_id).unwrap();
    assert_eq!(snapshot.status, expected);
}

fn assert_snapshot_consistent(manager: &MatchesManager, match_id: &str) {
    assert!(
        manager.verify_snapshot(match_id).unwrap(),
        "stored snapshot diverges from event replay"
    );
    let events = manager.get_events_for_match(match_id).unwrap();
    let versions: Vec<u64> = events.iter().map(|e| e.version).collect();
    let expected: Vec<u64> = (1..=events.len() as u64).collect();
    assert_eq!(versions, expected, "event versions must be contiguous from 1");
}

mod test_rights;
mod test_scoring;
