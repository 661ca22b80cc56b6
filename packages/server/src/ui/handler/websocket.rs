//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::ui::{handler::session::ChatSession, state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the connection's outbound channel into the WebSocket sink.
///
/// The same task sends a transport-level ping every `heartbeat` so that
/// intermediaries keep the connection open and dead peers are detected.
///
/// # Arguments
///
/// * `rx` - Outbound channel receiver (backlog, broadcasts, pongs)
/// * `sender` - WebSocket sink of this connection
/// * `heartbeat` - Interval between server pings
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    heartbeat: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + heartbeat, heartbeat);
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sender.close().await;
    })
}

/// Feed inbound frames to the session until the peer leaves, errors, or idles out.
async fn receive_loop(
    session: &mut ChatSession,
    receiver: &mut SplitStream<WebSocket>,
    idle_timeout: Duration,
) {
    loop {
        let next = match tokio::time::timeout(idle_timeout, receiver.next()).await {
            Ok(next) => next,
            Err(_) => {
                tracing::info!(
                    "Connection '{}' idle for {:?}, closing",
                    session.id(),
                    idle_timeout
                );
                break;
            }
        };
        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::debug!("WebSocket error on '{}': {}", session.id(), e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => session.handle_text(text.as_str()).await,
            Message::Close(_) => break,
            // Pong answers our heartbeat; counts as activity only.
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let config = state.session_config;

    let shutdown = state.shutdown_requested();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = ChatSession::new(state);
    let mut send_task = pusher_loop(rx, sender, config.heartbeat_interval);

    if let Err(e) = session.open(tx).await {
        tracing::warn!("Connection '{}' rejected: {}", session.id(), e);
        send_task.abort();
        return;
    }

    let id = session.id();
    tokio::select! {
        _ = receive_loop(&mut session, &mut receiver, config.idle_timeout) => {}
        _ = &mut send_task => {
            tracing::debug!("Writer of '{}' stopped", id);
        }
        _ = shutdown => {
            tracing::debug!("Closing '{}' for shutdown", id);
        }
    }

    session.close().await;
    send_task.abort();
}
