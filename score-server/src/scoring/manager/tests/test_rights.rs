use super::*;
use shared::scoring::ReleaseReason;

#[test]
fn test_request_and_approve() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);

    let resp = request(&manager, &match_id, "cap-a");
    assert!(resp.success);
    let snapshot = resp.snapshot.unwrap();
    assert_eq!(snapshot.rights.pending_requester(), Some("cap-a"));
    assert_eq!(snapshot.version, 2);

    let resp = approve(&manager, &match_id, "cap-b");
    assert!(resp.success);
    let snapshot = resp.snapshot.unwrap();
    assert_eq!(snapshot.rights.holder(), Some("cap-a"));
    let grant = snapshot.rights.grant().unwrap();
    assert_eq!(grant.approving_captain_id.as_deref(), Some("cap-b"));
    assert!(grant.granted_at.is_some());
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_request_by_non_captain() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);

    let resp = request(&manager, &match_id, "spectator");
    assert_rejected(&resp, CommandErrorCode::NotACaptainOfEitherTeam);
    assert_eq!(manager.get_snapshot(&match_id).unwrap().version, 1);
}

#[test]
fn test_repeat_request_is_noop() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);

    let first = request(&manager, &match_id, "cap-a");
    let again = request(&manager, &match_id, "cap-a");

    assert!(again.success);
    assert_eq!(again.version, first.version);
    assert_eq!(manager.get_events_for_match(&match_id).unwrap().len(), 2);
}

#[test]
fn test_competing_request_rejected() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    request(&manager, &match_id, "cap-a");

    let resp = request(&manager, &match_id, "cap-b");
    assert_rejected(&resp, CommandErrorCode::RightsAlreadyRequested);
    assert_eq!(
        manager.get_snapshot(&match_id).unwrap().rights.pending_requester(),
        Some("cap-a")
    );
}

#[test]
fn test_request_while_approved_rejected() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    grant_rights(&manager, &match_id, "cap-a", "cap-b");

    assert_rejected(
        &request(&manager, &match_id, "cap-b"),
        CommandErrorCode::MatchNotScheduledOrReleased,
    );
    assert_rejected(
        &request(&manager, &match_id, "cap-a"),
        CommandErrorCode::MatchNotScheduledOrReleased,
    );
}

#[test]
fn test_self_approval_rejected() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    request(&manager, &match_id, "cap-a");

    assert_rejected(&approve(&manager, &match_id, "cap-a"), CommandErrorCode::InvalidApprover);
    assert_rejected(&approve(&manager, &match_id, "spectator"), CommandErrorCode::InvalidApprover);

    let snapshot = manager.get_snapshot(&match_id).unwrap();
    assert!(snapshot.rights.holder().is_none());
    assert_eq!(snapshot.version, 2);
}

#[test]
fn test_approve_without_request() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);

    assert_rejected(&approve(&manager, &match_id, "cap-b"), CommandErrorCode::NoPendingRequest);
}

#[test]
fn test_cancel_request() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    request(&manager, &match_id, "cap-a");

    // Other captain may not withdraw someone else's request
    assert_rejected(
        &cancel(&manager, &match_id, "cap-b", OperatorRole::Captain),
        CommandErrorCode::CancelNotPermitted,
    );

    let resp = cancel(&manager, &match_id, "cap-a", OperatorRole::Captain);
    assert!(resp.success);
    assert_eq!(resp.snapshot.unwrap().rights, ScoringRights::Unclaimed);

    assert_rejected(
        &cancel(&manager, &match_id, "cap-a", OperatorRole::Captain),
        CommandErrorCode::NoPendingRequest,
    );

    // Rights can be requested again, by either captain
    assert!(request(&manager, &match_id, "cap-b").success);
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_admin_cancel_request() {
    let manager = create_test_manager();
    let match_id = schedule_match(&manager);
    request(&manager, &match_id, "cap-a");

    let resp = cancel(&manager, &match_id, "admin", OperatorRole::Admin);
    assert!(resp.success);
    assert_eq!(resp.snapshot.unwrap().rights, ScoringRights::Unclaimed);
}

#[test]
fn test_release_and_handover() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);
    assert!(ball(&manager, &match_id, "cap-a", BallInput::runs(2)).success);

    assert_rejected(
        &release(&manager, &match_id, "cap-b"),
        CommandErrorCode::RightsNotHeldByCaller,
    );

    let resp = release(&manager, &match_id, "cap-a");
    assert!(resp.success);
    assert!(matches!(
        resp.snapshot.unwrap().rights,
        ScoringRights::Released {
            reason: ReleaseReason::Explicit,
            ..
        }
    ));
    assert_rejected(&release(&manager, &match_id, "cap-a"), CommandErrorCode::NoActiveGrant);

    // Former holder can no longer score
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::runs(1)),
        CommandErrorCode::RightsNotHeldByCaller,
    );

    // Hand over to the other captain
    grant_rights(&manager, &match_id, "cap-b", "cap-a");
    assert!(ball(&manager, &match_id, "cap-b", BallInput::runs(3)).success);
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::runs(1)),
        CommandErrorCode::RightsNotHeldByCaller,
    );

    assert_eq!(current_innings(&manager, &match_id).total_runs, 5);
    assert_snapshot_consistent(&manager, &match_id);
}

#[test]
fn test_only_holder_scores() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);

    for (operator, role) in [
        ("cap-b", OperatorRole::Captain),
        ("spectator", OperatorRole::Captain),
        ("admin", OperatorRole::Admin),
    ] {
        let resp = manager.execute_command(
            command(
                operator,
                MatchCommandPayload::ApplyBallEvent {
                    match_id: match_id.clone(),
                    ball: BallInput::runs(1),
                },
            )
            .with_role(role),
        );
        assert_rejected(&resp, CommandErrorCode::RightsNotHeldByCaller);
    }
    assert_rejected(&undo(&manager, &match_id, "cap-b"), CommandErrorCode::RightsNotHeldByCaller);

    assert_eq!(current_innings(&manager, &match_id).total_runs, 0);
    assert!(manager.storage().get_deliveries(&match_id, 1).unwrap().is_empty());
}

#[test]
fn test_fielding_captain_only_policy() {
    let manager = create_manager_with_rules(fielding_only_rules());

    // cap-a holds rights while team A bats: rejected
    let match_id = live_match(&manager);
    assert_rejected(
        &ball(&manager, &match_id, "cap-a", BallInput::runs(1)),
        CommandErrorCode::ScorerPolicyViolation,
    );
    assert_rejected(
        &undo(&manager, &match_id, "cap-a"),
        CommandErrorCode::ScorerPolicyViolation,
    );

    // Same holder, team B batting: allowed
    let other = schedule_match(&manager);
    grant_rights(&manager, &other, "cap-a", "cap-b");
    assert!(start(&manager, &other, Some("B")).success);
    assert!(ball(&manager, &other, "cap-a", BallInput::runs(1)).success);
}

#[test]
fn test_expire_stale_requests() {
    let manager = create_test_manager();
    let stale = schedule_match(&manager);
    let approved = schedule_match(&manager);
    let idle = schedule_match(&manager);

    request(&manager, &stale, "cap-a");
    grant_rights(&manager, &approved, "cap-a", "cap-b");

    let requested_at = match manager.get_snapshot(&stale).unwrap().rights {
        ScoringRights::Requested { requested_at, .. } => requested_at,
        other => panic!("unexpected rights {:?}", other),
    };
    let timeout_ms = 60_000;

    // Not yet old enough
    let expired = manager
        .expire_stale_requests(requested_at + timeout_ms - 1, timeout_ms)
        .unwrap();
    assert!(expired.is_empty());

    let expired = manager
        .expire_stale_requests(requested_at + timeout_ms, timeout_ms)
        .unwrap();
    assert_eq!(expired, vec![stale.clone()]);

    assert_eq!(manager.get_snapshot(&stale).unwrap().rights, ScoringRights::Unclaimed);
    assert!(manager.get_snapshot(&approved).unwrap().rights.is_approved());
    assert_eq!(manager.get_snapshot(&idle).unwrap().version, 1);

    let last = manager.get_events_for_match(&stale).unwrap().pop().unwrap();
    assert_eq!(last.operator_id, "system");
    assert!(matches!(
        last.payload,
        shared::scoring::EventPayload::RightsRequestCancelled {
            reason: shared::scoring::CancelReason::Expired,
            ..
        }
    ));
    assert_snapshot_consistent(&manager, &stale);
}

#[test]
fn test_non_holder_rejected_while_racing_holder() {
    let manager = create_test_manager();
    let match_id = live_match(&manager);
    const BALLS: usize = 50;

    let (accepted, rejected) = std::thread::scope(|scope| {
        let holder = scope.spawn(|| {
            (0..BALLS)
                .filter(|_| ball(&manager, &match_id, "cap-a", BallInput::runs(1)).success)
                .count()
        });
        let intruder = scope.spawn(|| {
            (0..BALLS)
                .filter(|_| {
                    let resp = ball(&manager, &match_id, "cap-b", BallInput::runs(6));
                    resp.error_code() == Some(&CommandErrorCode::RightsNotHeldByCaller)
                })
                .count()
        });
        (holder.join().unwrap(), intruder.join().unwrap())
    });

    assert_eq!(accepted, BALLS);
    assert_eq!(rejected, BALLS);

    let innings = current_innings(&manager, &match_id);
    assert_eq!(innings.total_runs, BALLS as u32);
    let log = manager.storage().get_deliveries(&match_id, 1).unwrap();
    assert_eq!(log.len(), BALLS);
    assert!(log.iter().all(|b| b.runs_off_bat == 1));
    assert_snapshot_consistent(&manager, &match_id);
}
