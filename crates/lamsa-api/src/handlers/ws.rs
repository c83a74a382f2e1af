//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use lamsa_realtime::{ConnectionHandle, InboundMessage, OutboundMessage};

use crate::state::AppState;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// The recipient this connection belongs to.
    pub recipient_id: Uuid,
}

/// GET /ws?recipient_id={uuid} — WebSocket upgrade
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, query.recipient_id, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, recipient_id: Uuid, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let buffer = state.config.realtime.channel_buffer_size;
    let (tx, mut outbound_rx) = mpsc::channel::<OutboundMessage>(buffer);
    let handle = Arc::new(ConnectionHandle::new(recipient_id, tx));
    let conn_id = handle.id;
    state.registry.register(handle.clone());

    info!(%conn_id, %recipient_id, "WebSocket connection established");

    // Forward registry messages out to the client as JSON text frames.
    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound frame");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(InboundMessage::Ping) => {
                    handle.send(OutboundMessage::Pong);
                }
                Ok(InboundMessage::JoinRoom { room }) => {
                    info!(%conn_id, room = %room, "Joined room");
                    state.registry.join_room(&room, conn_id);
                }
                Ok(InboundMessage::LeaveRoom { room }) => {
                    state.registry.leave_room(&room, &conn_id);
                }
                // Bare "ping" frames are accepted as heartbeats too.
                Err(_) if text.trim() == "ping" => {
                    handle.send(OutboundMessage::Pong);
                }
                Err(_) => {}
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(%conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.registry.unregister(&conn_id);

    info!(%conn_id, %recipient_id, "WebSocket connection closed");
}
