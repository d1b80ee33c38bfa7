use super::*;
use shared::scoring::{ExtraKind, OverCount};

fn score(manager: &MatchesManager, match_id: &str, inputs: &[BallInput]) {
    for input in inputs {
        let resp = ball(manager, match_id, "cap-a", *input);
        assert!(resp.success, "ball {:?} failed: {:?}", input, resp.error);
    }
}

#[test]
fn test_reference_sequence_and_undo() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    score(
        &manager,
        &match_id,
        &[
            BallInput::runs(1),
            BallInput::extra(ExtraKind::Wide, 0),
            BallInput::runs(4),
            BallInput::wicket(),
            BallInput::extra(ExtraKind::LegBye, 1),
        ],
    );

    let innings = current_innings(&manager, &match_id);
    assert_eq!(innings.total_runs, 7);
    assert_eq!(innings.total_wickets, 1);
    assert_eq!(innings.total_overs, OverCount::new(0, 4));
    assert_eq!(innings.extras, 2);

    let resp = undo(&manager, &match_id, "cap-a");
    assert!(resp.success);

    let innings = current_innings(&manager, &match_id);
    assert_eq!(innings.total_runs, 6);
    assert_eq!(innings.total_wickets, 1);
    assert_eq!(innings.total_overs, OverCount::new(0, 3));
    assert_eq!(innings.extras, 1);

    let log = manager.storage().get_deliveries(&match_id, 1).unwrap();
    let sequences: Vec<u64> = log.iter().map(|b| b.sequence_number).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_over_rolls_after_six_legal_balls() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    score(&manager, &match_id, &[BallInput::runs(1); 5]);
    score(
        &manager,
        &match_id,
        &[
            BallInput::extra(ExtraKind::Wide, 0),
            BallInput::extra(ExtraKind::NoBall, 0),
        ],
    );
    assert_eq!(current_innings(&manager, &match_id).total_overs, OverCount::new(0, 5));

    score(&manager, &match_id, &[BallInput::runs(2)]);
    let innings = current_innings(&manager, &match_id);
    assert_eq!(innings.total_overs, OverCount::new(1, 0));
    assert_eq!(innings.total_overs.as_fractional_overs(), 1.0);
    assert_eq!(innings.total_runs, 9);
    assert_eq!(innings.extras, 2);
}

#[test]
fn test_undo_on_empty_innings() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    assert_rejected(&undo(&manager, &match_id, "cap-a"), CommandErrorCode::NothingToUndo);

    score(&manager, &match_id, &[BallInput::runs(3)]);
    assert!(undo(&manager, &match_id, "cap-a").success);
    assert_rejected(&undo(&manager, &match_id, "cap-a"), CommandErrorCode::NothingToUndo);

    let innings = current_innings(&manager, &match_id);
    assert_eq!(innings, Innings::new(1, "A"));
}

#[test]
fn test_undo_then_record_reuses_sequence() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    score(&manager, &match_id, &[BallInput::runs(1), BallInput::runs(2)]);
    assert!(undo(&manager, &match_id, "cap-a").success);
    score(&manager, &match_id, &[BallInput::runs(6)]);

    let log = manager.storage().get_deliveries(&match_id, 1).unwrap();
    let runs: Vec<(u64, u32)> = log.iter().map(|b| (b.sequence_number, b.runs_off_bat)).collect();
    assert_eq!(runs, vec![(1, 1), (2, 6)]);
    assert_eq!(current_innings(&manager, &match_id).total_runs, 7);
}

#[test]
fn test_wicket_limit() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    score(&manager, &match_id, &[BallInput::wicket(); 10]);
    assert_eq!(current_innings(&manager, &match_id).total_wickets, 10);

    let version = manager.get_snapshot(&match_id).unwrap().version;
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::wicket()),
        CommandErrorCode::WicketLimitExceeded,
    );
    assert_eq!(manager.get_snapshot(&match_id).unwrap().version, version);
    assert_eq!(manager.storage().get_deliveries(&match_id, 1).unwrap().len(), 10);

    // Non-wicket deliveries are still accepted
    assert!(ball(&manager, &match_id, "cap-a", BallInput::runs(1)).success);
}

#[test]
fn test_invalid_shape_leaves_state_untouched() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);
    score(&manager, &match_id, &[BallInput::runs(2)]);

    let before = manager.get_snapshot(&match_id).unwrap();

    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::runs(8)),
        CommandErrorCode::InvalidEventShape,
    );
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::extra(ExtraKind::Wide, 2)),
        CommandErrorCode::InvalidEventShape,
    );
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::extra(ExtraKind::NoBall, 1)),
        CommandErrorCode::InvalidEventShape,
    );

    let after = manager.get_snapshot(&match_id).unwrap();
    assert_eq!(after, before);
    assert_eq!(manager.storage().get_deliveries(&match_id, 1).unwrap().len(), 1);
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_scoring_requires_live_match() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    grant_rights(&manager, &match_id, "cap-a", "cap-b");

    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::runs(1)),
        CommandErrorCode::MatchNotLive,
    );
    assert_rejected(&undo(&manager, &match_id, "cap-a"), CommandErrorCode::MatchNotLive);
}

#[test]
fn test_second_innings_has_own_log() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    score(&manager, &match_id, &[BallInput::runs(4), BallInput::runs(6)]);
    assert!(next_innings(&manager, &match_id, "cap-a").success);

    // Undo never reaches into the completed innings
    assert_rejected(&undo(&manager, &match_id, "cap-a"), CommandErrorCode::NothingToUndo);

    score(&manager, &match_id, &[BallInput::runs(1), BallInput::extra(ExtraKind::Bye, 2)]);

    let snapshot = manager.get_snapshot(&match_id).unwrap();
    assert_eq!(snapshot.innings[0].total_runs, 10);
    assert_eq!(snapshot.innings[1].batting_team_id, "B");
    assert_eq!(snapshot.innings[1].total_runs, 3);
    assert_eq!(snapshot.innings[1].extras, 2);
    assert_eq!(snapshot.innings[1].total_overs, OverCount::new(0, 2));

    assert_eq!(manager.storage().get_deliveries(&match_id, 1).unwrap().len(), 2);
    assert_eq!(manager.storage().get_deliveries(&match_id, 2).unwrap().len(), 2);
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_event_log_versions() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);
    score(&manager, &match_id, &[BallInput::runs(1), BallInput::runs(1)]);
    undo(&manager, &match_id, "cap-a");

    // schedule, request, approve, start, 2 balls, undo
    let events = manager.get_events_for_match(&match_id).unwrap();
    assert_eq!(events.len(), 7);
    assert_eq!(manager.get_snapshot(&match_id).unwrap().version, 7);

    let since = manager.get_events_since(&match_id, 4).unwrap();
    let versions: Vec<u64> = since.iter().map(|e| e.version).collect();
    assert_eq!(versions, vec![5, 6, 7]);
    assert!(manager.get_events_since(&match_id, 7).unwrap().is_empty());

    assert_snapshot_consistent(&manager, &match_id);
}
