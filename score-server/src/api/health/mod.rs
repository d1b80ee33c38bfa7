//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/health | GET | 简单健康检查 |
//! | /api/health/detailed | GET | 存储和广播状态 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::SystemTime;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (healthy | degraded)
    status: &'static str,
    version: &'static str,
    /// 服务器实例 epoch
    epoch: String,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    epoch: String,
    uptime_seconds: u64,
    checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    storage: CheckResult,
    /// 未结束的比赛数
    live_matches: Option<usize>,
    /// 有订阅者的比赛通道数
    broadcast_channels: usize,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    latency_ms: Option<u64>,
    message: Option<String>,
}

// 服务器启动时间 (懒加载静态变量)
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// 在启动时调用，让 uptime 从服务启动开始计算
pub fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.epoch().to_string(),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let manager = state.manager.clone();
    let started = std::time::Instant::now();
    let live = tokio::task::spawn_blocking(move || manager.get_live_matches()).await;

    let (storage, live_matches) = match live {
        Ok(Ok(matches)) => (
            CheckResult {
                status: "ok",
                latency_ms: Some(started.elapsed().as_millis() as u64),
                message: None,
            },
            Some(matches.len()),
        ),
        Ok(Err(e)) => (
            CheckResult {
                status: "error",
                latency_ms: None,
                message: Some(format!("Storage error: {}", e)),
            },
            None,
        ),
        Err(e) => (
            CheckResult {
                status: "error",
                latency_ms: None,
                message: Some(format!("Health probe failed: {}", e)),
            },
            None,
        ),
    };

    Json(DetailedHealthResponse {
        status: if storage.status == "ok" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.epoch().to_string(),
        uptime_seconds: get_uptime_seconds(),
        checks: HealthChecks {
            storage,
            live_matches,
            broadcast_channels: state.manager.broadcaster().channel_count(),
        },
    })
}
