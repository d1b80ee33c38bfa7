//! Rights Expiry Worker - returns stale scoring-rights requests to Unclaimed
//!
//! A captain's request that the other captain never answers would otherwise
//! block the match forever. The worker periodically scans live matches and
//! cancels requests older than the configured timeout as `System`.
//!
//! Note: redb operations are synchronous, so each sweep runs on the blocking pool.

use super::manager::MatchesManager;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Periodic sweeper for pending requests
pub struct RightsExpiryWorker {
    manager: MatchesManager,
    timeout: Duration,
    interval: Duration,
    shutdown: CancellationToken,
}

impl RightsExpiryWorker {
    pub fn new(
        manager: MatchesManager,
        timeout: Duration,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            timeout,
            interval,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled
    pub async fn run(self) {
        tracing::info!(
            timeout_secs = self.timeout.as_secs(),
            interval_secs = self.interval.as_secs(),
            "RightsExpiryWorker started"
        );

        let mut scan_interval = tokio::time::interval(self.interval);
        scan_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("RightsExpiryWorker shutting down");
                    break;
                }
                _ = scan_interval.tick() => {
                    self.sweep().await;
                }
            }
        }
    }

    /// One pass over live matches; returns the matches whose request expired
    pub async fn sweep(&self) -> Vec<String> {
        let manager = self.manager.clone();
        let timeout_ms = i64::try_from(self.timeout.as_millis()).unwrap_or(i64::MAX);
        let now = shared::util::now_millis();

        let result =
            tokio::task::spawn_blocking(move || manager.expire_stale_requests(now, timeout_ms)).await;

        match result {
            Ok(Ok(expired)) => {
                if !expired.is_empty() {
                    tracing::info!(count = expired.len(), "Expired stale scoring-rights requests");
                }
                expired
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Rights expiry sweep failed");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Rights expiry sweep task failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::policy::ScoringRules;
    use crate::scoring::storage::MatchStorage;
    use shared::scoring::{MatchCommand, MatchCommandPayload, OperatorRole, ScoringRights, TeamSide};

    fn create_test_manager() -> MatchesManager {
        let storage = MatchStorage::open_in_memory().unwrap();
        MatchesManager::with_storage(storage, ScoringRules::default())
    }

    fn team(id: &str, captain: &str) -> TeamSide {
        TeamSide {
            team_id: id.to_string(),
            name: format!("Team {}", id),
            captain_id: captain.to_string(),
        }
    }

    fn match_with_pending_request(manager: &MatchesManager) -> String {
        let schedule = MatchCommand::new(
            "admin",
            "Admin",
            MatchCommandPayload::ScheduleMatch {
                team_a: team("A", "cap-a"),
                team_b: team("B", "cap-b"),
                tournament_id: None,
                venue: None,
                scheduled_at: 0,
            },
        )
        .with_role(OperatorRole::Admin);
        let match_id = manager.execute_command(schedule).match_id.unwrap();

        let request = MatchCommand::new(
            "cap-a",
            "Captain A",
            MatchCommandPayload::RequestScoringRights {
                match_id: match_id.clone(),
            },
        );
        assert!(manager.execute_command(request).success);
        match_id
    }

    fn worker(manager: &MatchesManager, timeout: Duration) -> (RightsExpiryWorker, CancellationToken) {
        let token = CancellationToken::new();
        let worker = RightsExpiryWorker::new(
            manager.clone(),
            timeout,
            Duration::from_millis(10),
            token.clone(),
        );
        (worker, token)
    }

    #[tokio::test]
    async fn test_sweep_expires_old_requests() {
        let manager = create_test_manager();
        let match_id = match_with_pending_request(&manager);

        let (worker, _token) = worker(&manager, Duration::ZERO);
        let expired = worker.sweep().await;

        assert_eq!(expired, vec![match_id.clone()]);
        assert_eq!(
            manager.get_snapshot(&match_id).unwrap().rights,
            ScoringRights::Unclaimed
        );
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_requests() {
        let manager = create_test_manager();
        let match_id = match_with_pending_request(&manager);

        let (worker, _token) = worker(&manager, Duration::from_secs(3600));
        assert!(worker.sweep().await.is_empty());
        assert_eq!(
            manager.get_snapshot(&match_id).unwrap().rights.pending_requester(),
            Some("cap-a")
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let manager = create_test_manager();
        let match_id = match_with_pending_request(&manager);

        let (worker, token) = worker(&manager, Duration::ZERO);
        let handle = tokio::spawn(worker.run());

        // First tick fires immediately
        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.get_snapshot(&match_id).unwrap().rights != ScoringRights::Unclaimed {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("request was never expired");

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
