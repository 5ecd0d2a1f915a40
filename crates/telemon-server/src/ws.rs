//! `WebSocket` handler streaming broadcast frames to observers.
//!
//! Clients connect to `GET /data` and receive every frame the hub
//! dispatches after their registration, in broadcast order, as JSON text
//! frames. The handler owns the observer lifecycle: register on upgrade,
//! drain the private outbound queue into the socket, and unregister on
//! close or error. If the hub evicts the observer (queue saturated), the
//! queue simply ends -- no reason is delivered.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::debug;

use crate::hub::Observer;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming broadcast frames.
///
/// # Route
///
/// `GET /data`
pub async fn ws_data(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: register with the hub, forward each
/// queued frame as a text message, and unregister on disconnect.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let (observer, mut queue) = Observer::new();
    let id = observer.id;
    if state.hub.register_tx.send(observer).await.is_err() {
        debug!(%id, "hub gone; dropping new observer");
        return;
    }
    debug!(%id, "observer connected");

    loop {
        tokio::select! {
            // A frame arrived on this observer's private queue.
            queued = queue.recv() => match queued {
                Some(bytes) => {
                    let Ok(text) = String::from_utf8(bytes) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        debug!(%id, "observer disconnected (send failed)");
                        break;
                    }
                }
                // Queue closed: the hub evicted this observer.
                None => {
                    debug!(%id, "observer evicted by hub");
                    break;
                }
            },
            // Check if the client sent a close frame or disconnected.
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    debug!(%id, "observer closed the connection");
                    break;
                }
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        debug!(%id, "observer disconnected (pong failed)");
                        break;
                    }
                }
                Some(Err(error)) => {
                    debug!(%id, %error, "websocket error");
                    break;
                }
                _ => {
                    // Ignore text/binary from the client.
                }
            },
        }
    }

    // Harmless if the hub already evicted us.
    let _ = state.hub.unregister_tx.send(id).await;
    debug!(%id, "observer unregistered");
}
