//! Match API Handlers
//!
//! redb is synchronous, so every manager call runs on the blocking pool.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::scoring::{
    CommandResponse, MatchCommand, MatchEvent, MatchSnapshot, SyncRequest, SyncResponse,
};

use crate::core::ServerState;
use crate::scoring::ManagerResult;
use crate::utils::{AppError, AppResult};

/// Run a manager call off the async workers
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> ManagerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(AppError::from)
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    #[serde(default)]
    pub since_version: u64,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub match_id: String,
    pub version: u64,
    pub consistent: bool,
}

/// Execute a command
///
/// Rejections come back as `success: false` with a `CommandErrorCode`, not
/// as an HTTP error.
pub async fn execute_command(
    State(state): State<ServerState>,
    Json(cmd): Json<MatchCommand>,
) -> AppResult<Json<CommandResponse>> {
    let manager = state.manager.clone();
    let response = tokio::task::spawn_blocking(move || manager.execute_command(cmd))
        .await
        .map_err(|e| AppError::internal(format!("Command task failed: {}", e)))?;
    Ok(Json(response))
}

/// Non-terminal matches
pub async fn list_live(State(state): State<ServerState>) -> AppResult<Json<Vec<MatchSnapshot>>> {
    let manager = state.manager.clone();
    let matches = blocking(move || manager.get_live_matches()).await?;
    Ok(Json(matches))
}

pub async fn get_snapshot(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MatchSnapshot>> {
    let manager = state.manager.clone();
    let snapshot = blocking(move || manager.get_snapshot(&id)).await?;
    Ok(Json(snapshot))
}

/// Event log after `since_version`
pub async fn get_events(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<VersionQuery>,
) -> AppResult<Json<Vec<MatchEvent>>> {
    let manager = state.manager.clone();
    let events = blocking(move || {
        // Unknown match is a 404, not an empty log
        manager.get_snapshot(&id)?;
        manager.get_events_since(&id, query.since_version)
    })
    .await?;
    Ok(Json(events))
}

/// Reconnection catch-up
pub async fn sync(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<VersionQuery>,
) -> AppResult<Json<SyncResponse>> {
    let service = state.sync.clone();
    let request = SyncRequest {
        match_id: id,
        since_version: query.since_version,
    };
    let response = blocking(move || service.sync(&request)).await?;
    Ok(Json(response))
}

/// Rebuild from the event log and compare with the stored snapshot
pub async fn verify(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<VerifyResponse>> {
    let manager = state.manager.clone();
    let response = blocking(move || {
        let consistent = manager.verify_snapshot(&id)?;
        let version = manager.get_snapshot(&id)?.version;
        Ok(VerifyResponse {
            match_id: id,
            version,
            consistent,
        })
    })
    .await?;
    Ok(Json(response))
}
