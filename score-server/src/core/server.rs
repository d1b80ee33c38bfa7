//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::Router;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerState};
use crate::scoring::RightsExpiryWorker;
use crate::utils::logger::{APP_LOG_RETENTION_DAYS, cleanup_old_logs};

/// Idle broadcast channels are dropped this often
const CHANNEL_PRUNE_INTERVAL_SECS: u64 = 60;
const LOG_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// All routes with tracing and CORS layers
    pub fn router(state: ServerState) -> Router {
        crate::api::router()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    fn start_background_tasks(&self, state: &ServerState) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = RightsExpiryWorker::new(
            state.manager.clone(),
            self.config.rights_request_timeout(),
            self.config.rights_expiry_interval(),
            tasks.shutdown_token(),
        );
        tasks.spawn("rights_expiry", TaskKind::Worker, worker.run());

        let broadcaster = state.manager.broadcaster().clone();
        tasks.spawn_periodic(
            "prune_broadcast_channels",
            Duration::from_secs(CHANNEL_PRUNE_INTERVAL_SECS),
            move || {
                let pruned = broadcaster.prune_idle();
                if pruned > 0 {
                    tracing::debug!(pruned, "Dropped idle broadcast channels");
                }
            },
        );

        if let Some(dir) = &self.config.log_dir {
            let log_dir = PathBuf::from(dir);
            tasks.spawn_periodic(
                "log_cleanup",
                Duration::from_secs(LOG_CLEANUP_INTERVAL_SECS),
                move || {
                    if let Err(e) = cleanup_old_logs(&log_dir, APP_LOG_RETENTION_DAYS) {
                        tracing::warn!(error = %e, "Log cleanup failed");
                    }
                },
            );
        }

        tasks.log_summary();
        tasks
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };
        crate::api::health::mark_started();

        let tasks = self.start_background_tasks(&state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %addr,
            epoch = %state.epoch(),
            environment = %self.config.environment,
            "🏏 Score server listening"
        );

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, Self::router(state))
            .with_graceful_shutdown(shutdown)
            .await;

        if tasks.check_health() > 0 {
            tracing::warn!("Some background tasks had stopped before shutdown");
        }
        tasks
            .shutdown(Duration::from_millis(self.config.shutdown_timeout_ms))
            .await;

        served?;
        Ok(())
    }
}
