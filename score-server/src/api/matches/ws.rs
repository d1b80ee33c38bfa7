//! WebSocket subscription to one match
//!
//! Stream: one `SNAPSHOT`, then an `UPDATE` per accepted command in version
//! order. A subscriber that falls behind gets `RESYNC` followed by a fresh
//! `SNAPSHOT`. The socket closes after the final update of a finished match.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::scoring::StreamMessage;
use std::time::Duration;

use crate::core::ServerState;
use crate::scoring::{MatchSubscription, MatchesManager, SubscriptionItem};
use crate::utils::{AppError, AppResult};

const PING_INTERVAL_SECS: u64 = 30;

/// GET /api/matches/{id}/ws — upgrade to WebSocket
pub async fn subscribe(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    // Attach before upgrading so an unknown match is a plain 404
    let manager = state.manager.clone();
    let subscription = tokio::task::spawn_blocking(move || manager.subscribe(&id))
        .await
        .map_err(|e| AppError::internal(format!("Subscribe task failed: {}", e)))??;

    let manager = state.manager.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, manager, subscription)))
}

fn encode(msg: &StreamMessage) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode stream message");
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, manager: MatchesManager, mut subscription: MatchSubscription) {
    let match_id = subscription.match_id().to_string();
    let (mut ws_sink, mut ws_stream) = socket.split();

    tracing::info!(
        match_id = %match_id,
        version = subscription.last_version(),
        "Match subscriber connected"
    );

    let initial = StreamMessage::Snapshot {
        snapshot: subscription.initial_snapshot().clone(),
    };
    if let Some(msg) = encode(&initial)
        && ws_sink.send(msg).await.is_err()
    {
        return;
    }

    let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
    ping_interval.tick().await; // skip immediate tick

    loop {
        tokio::select! {
            item = subscription.next() => {
                match item {
                    SubscriptionItem::Update(update) => {
                        if let Some(msg) = encode(&StreamMessage::Update { update })
                            && ws_sink.send(msg).await.is_err()
                        {
                            break;
                        }
                    }
                    SubscriptionItem::Resync { last_version } => {
                        if let Some(msg) = encode(&StreamMessage::Resync { last_version })
                            && ws_sink.send(msg).await.is_err()
                        {
                            break;
                        }

                        let manager = manager.clone();
                        let id = match_id.clone();
                        let fresh = tokio::task::spawn_blocking(move || manager.get_snapshot(&id)).await;
                        let snapshot = match fresh {
                            Ok(Ok(snapshot)) => snapshot,
                            Ok(Err(e)) => {
                                tracing::error!(match_id = %match_id, error = %e, "Resync snapshot failed");
                                break;
                            }
                            Err(e) => {
                                tracing::error!(match_id = %match_id, error = %e, "Resync task failed");
                                break;
                            }
                        };

                        subscription.resynced(snapshot.version);
                        tracing::info!(
                            match_id = %match_id,
                            from = last_version,
                            to = snapshot.version,
                            "Subscriber resynced"
                        );
                        if let Some(msg) = encode(&StreamMessage::Snapshot { snapshot })
                            && ws_sink.send(msg).await.is_err()
                        {
                            break;
                        }
                    }
                    SubscriptionItem::Closed => {
                        let _ = ws_sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(match_id = %match_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {} // Observers are read-only; commands go over HTTP
                }
            }
            _ = ping_interval.tick() => {
                if ws_sink.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!(match_id = %match_id, "Match subscriber disconnected");
}
