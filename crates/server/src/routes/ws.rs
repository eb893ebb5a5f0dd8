//! WebSocket handlers for real-time updates.
//!
//! # Endpoints
//!
//! - `GET /ws/products` - Product list stream
//! - `GET /ws/chat` - Chat room
//!
//! # Protocol
//!
//! Products: on connect the client receives the latest snapshot, then every
//! new list as `{"event":"productos","seq":N,"payload":[...]}`. Updates with
//! a `seq` at or below the last one sent are skipped, so a client never moves
//! back to an older list.
//!
//! Chat: on connect the client receives `{"event":"messageLogs","payload":[...]}`
//! with recent history. Clients send `{"user":"..","message":".."}`; each
//! accepted message is stored and sent to everyone as
//! `{"event":"message","payload":{...}}`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use storage::Store;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use types::IncomingMessage;

use super::views::CHAT_HISTORY;
use crate::broadcast::{ProductBroadcaster, ProductsUpdate};
use crate::service::blocking;
use crate::state::ServerState;

/// Chat wire event.
#[derive(Debug, Serialize)]
pub struct ChatEvent<T> {
    pub event: &'static str,
    pub payload: T,
}

/// Serialize and send one JSON frame. `false` once the client is gone.
async fn send_json<S, T>(sender: &mut S, value: &T) -> bool
where
    S: Sink<Message> + Unpin,
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!("Failed to serialize WebSocket event: {}", e);
            true
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// WebSocket upgrade handler: `GET /ws/products`
pub async fn products_ws(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_products(socket, state))
}

/// Send `update` unless the client already holds something as new.
async fn forward<S>(sender: &mut S, last_seq: &mut Option<u64>, update: &ProductsUpdate) -> bool
where
    S: Sink<Message> + Unpin,
{
    if last_seq.is_some_and(|seq| update.seq <= seq) {
        return true;
    }
    *last_seq = Some(update.seq);
    send_json(sender, update).await
}

/// Feed product lists into `sender`: the snapshot first, then every newer
/// update. Returns when the client is gone or the channel closes.
///
/// `rx` must be subscribed before the call so no publish falls between the
/// snapshot and the first `recv`.
async fn stream_products<S>(
    sender: &mut S,
    broadcaster: &ProductBroadcaster,
    store: &Arc<Store>,
    mut rx: broadcast::Receiver<ProductsUpdate>,
) where
    S: Sink<Message> + Unpin,
{
    let mut last_seq = None;

    match broadcaster.snapshot(store).await {
        Ok(snapshot) => {
            if !forward(sender, &mut last_seq, &snapshot).await {
                return;
            }
        }
        Err(e) => warn!(error = %e, "initial product snapshot failed"),
    }

    loop {
        match rx.recv().await {
            Ok(update) => {
                if !forward(sender, &mut last_seq, &update).await {
                    break; // Client disconnected
                }
            }
            Err(RecvError::Lagged(n)) => {
                debug!("products client lagged by {} updates", n);
                // Every update is the full list, so the newest one is enough
                if let Some(latest) = broadcaster.latest() {
                    if !forward(sender, &mut last_seq, &latest).await {
                        break;
                    }
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn handle_products(socket: WebSocket, state: ServerState) {
    state.metrics.ws_connect();
    debug!("products WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    let rx = state.broadcaster.subscribe();
    let broadcaster = state.broadcaster.clone();
    let store = state.store.clone();

    let send_task = tokio::spawn(async move {
        stream_products(&mut sender, &broadcaster, &store, rx).await;
    });

    // Clients only listen; drain until they close
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state.metrics.ws_disconnect();
    debug!("products WebSocket client disconnected");
}

// =============================================================================
// Chat
// =============================================================================

/// WebSocket upgrade handler: `GET /ws/chat`
pub async fn chat_ws(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_chat(socket, state))
}

async fn handle_chat(socket: WebSocket, state: ServerState) {
    state.metrics.ws_connect();
    debug!("chat WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut chat_rx = state.subscribe_chat();

    let store = state.store.clone();
    let send_task = tokio::spawn(async move {
        match blocking(&store, |s| s.list_messages(CHAT_HISTORY)).await {
            Ok(history) => {
                let logs = ChatEvent {
                    event: "messageLogs",
                    payload: history,
                };
                if !send_json(&mut sender, &logs).await {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "chat history unavailable"),
        }

        loop {
            match chat_rx.recv().await {
                Ok(message) => {
                    let event = ChatEvent {
                        event: "message",
                        payload: message,
                    };
                    if !send_json(&mut sender, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => debug!("chat client lagged by {} messages", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let recv_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => accept_message(&recv_state, text.as_str()).await,
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {} // Ignore ping/pong/binary
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state.metrics.ws_disconnect();
    debug!("chat WebSocket client disconnected");
}

/// Store and fan out one client message. Malformed input is dropped.
async fn accept_message(state: &ServerState, text: &str) {
    let Some((user, message)) = serde_json::from_str::<IncomingMessage>(text)
        .ok()
        .and_then(|incoming| incoming.sanitized())
    else {
        debug!("Invalid chat message from client: {}", text);
        return;
    };

    match blocking(&state.store, move |s| s.add_message(&user, &message)).await {
        Ok(stored) => {
            state.metrics.chat_message();
            // Err only means no client is listening
            let _ = state.chat_tx.send(stored);
        }
        Err(e) => warn!(error = %e, "failed to store chat message"),
    }
}
