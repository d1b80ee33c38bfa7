//! Match API Module
//!
//! Every mutation is a `MatchCommand` posted to `/api/matches/commands` and
//! processed by `MatchesManager`; the rest is read-only.
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/matches/commands | POST | 执行命令，返回 CommandResponse |
//! | /api/matches | GET | 未结束的比赛 |
//! | /api/matches/{id} | GET | 比赛快照 |
//! | /api/matches/{id}/events | GET | 事件日志 (since_version) |
//! | /api/matches/{id}/sync | GET | 断线重连同步 |
//! | /api/matches/{id}/verify | GET | 快照重放校验 |
//! | /api/matches/{id}/ws | GET | 实时订阅 (WebSocket) |

mod handler;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Match router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/matches", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_live))
        .route("/commands", post(handler::execute_command))
        .route("/{id}", get(handler::get_snapshot))
        .route("/{id}/events", get(handler::get_events))
        .route("/{id}/sync", get(handler::sync))
        .route("/{id}/verify", get(handler::verify))
        .route("/{id}/ws", get(ws::subscribe))
}
