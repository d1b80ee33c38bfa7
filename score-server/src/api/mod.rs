//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`matches`] - 比赛命令、查询、同步和实时订阅

pub mod health;
pub mod matches;

use axum::Router;

use crate::core::ServerState;

/// 组装所有路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(matches::router())
}

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
