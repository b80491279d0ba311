//! WebSocket handler for vendor realtime channels
//!
//! 一个 viewer 一个连接：`GET /api/ws?vendorId=...`。服务端只推送，
//! 帧格式为 JSON 文本 `{"type": "NEW_ORDER", ...}`。
//!
//! 员工账号 (waiter / kitchen) 连接到所属 owner 的频道。

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::catalog::Catalog;
use crate::core::ServerState;
use crate::live::{HubError, LiveSubscription};

/// 服务端心跳间隔
const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/ws", get(handle_live_ws))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveQuery {
    pub vendor_id: String,
}

/// GET /api/ws: upgrade to WebSocket
///
/// 连接数检查在 upgrade 之前完成，超限直接返回 429。
pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let requested = query.vendor_id.trim().to_string();
    if requested.is_empty() {
        return Err(AppError::validation("vendorId is required").with_detail("field", "vendorId"));
    }

    let channel_id = resolve_channel(&state, &requested).await?;
    let subscription = state.live.subscribe(&channel_id).map_err(|e| {
        let message = e.to_string();
        match e {
            HubError::ConnectionLimit { vendor_id, max } => {
                tracing::warn!(vendor_id = %vendor_id, max, "Realtime connection limit reached");
                AppError::with_message(ErrorCode::ConnectionLimitReached, message)
                    .with_detail("vendorId", vendor_id)
                    .with_detail("max", max)
            }
        }
    })?;

    Ok(ws.on_upgrade(move |socket| handle_live_connection(socket, state, subscription)))
}

/// 员工账号映射到 owner 的频道；目录里没有的 vendor 按原 id 订阅
async fn resolve_channel(state: &ServerState, vendor_id: &str) -> Result<String, AppError> {
    let catalog = state.catalog.clone();
    let lookup_id = vendor_id.to_string();
    let vendor = tokio::task::spawn_blocking(move || catalog.get_vendor(&lookup_id))
        .await
        .map_err(|e| AppError::internal(format!("Catalog task failed: {e}")))?
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok(match vendor {
        Some(vendor) => vendor.channel_id().to_string(),
        None => {
            tracing::debug!(vendor_id, "Vendor not in catalog, subscribing by id");
            vendor_id.to_string()
        }
    })
}

async fn handle_live_connection(socket: WebSocket, state: ServerState, mut subscription: LiveSubscription) {
    let vendor_id = subscription.vendor_id().to_string();
    let connection_id = subscription.id();
    tracing::info!(vendor_id = %vendor_id, connection_id, "Live viewer connected");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await; // skip immediate

    loop {
        tokio::select! {
            event = subscription.rx.recv() => {
                match event {
                    Ok(event) => {
                        let json = match serde_json::to_string(event.as_ref()) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!(vendor_id = %vendor_id, "Failed to encode live event: {e}");
                                continue;
                            }
                        };
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // viewer 重连后自行拉取全量，这里只记录
                        tracing::warn!(vendor_id = %vendor_id, connection_id, skipped = n, "Live viewer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping.tick() => {
                if ws_sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(vendor_id = %vendor_id, connection_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {} // Text, Binary, Ping, Pong: ignore
                }
            }
        }
    }

    state.live.unsubscribe(subscription);
    tracing::info!(vendor_id = %vendor_id, connection_id, "Live viewer disconnected");
}
