//! Real-time channel: every connected socket receives each mutation event
//! as a JSON text frame.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::Response;
use dishboard_protocol::DishEvent;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

pub async fn upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let origin = headers.get(ORIGIN);
    if !state.origin_allowed(origin) {
        warn!("rejected real-time connection (origin={:?})", origin);
        return Err(ApiError::OriginRejected);
    }
    // Subscribe before the handshake completes so no event published after
    // the upgrade response is missed.
    let receiver = state.events.subscribe();
    let shutdown = state.shutdown_receiver();
    Ok(ws.on_upgrade(move |socket| forward_events(socket, receiver, shutdown)))
}

async fn forward_events(
    socket: WebSocket,
    mut receiver: broadcast::Receiver<DishEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("subscriber connected");
    let (mut sink, mut incoming) = socket.split();
    loop {
        if *shutdown.borrow() {
            let _ = sink.send(Message::Close(None)).await;
            break;
        }
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            event = receiver.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!("failed to encode event (event={}, error={})", event.name(), err);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("subscriber lagged (skipped={})", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => debug!("ignoring inbound frame"),
            },
        }
    }
    info!("subscriber disconnected");
}
