//! WebSocket subscription endpoints (spec §6): `depth`, `ledger`, `notify`,
//! `session`. Each registers with its stream's [`hub::Hub`], optionally
//! replays since a client-supplied timestamp, then forwards live traffic
//! until the socket closes. Ping/pong cadence matches the reference
//! `routes/ws/session.go`: ~20s keepalive pings, ~40s read deadline.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Instant};

use crate::state::{AppState, SESSION_USER_ID};
use crate::wire::{SessionStatusMessage, SubscribeQuery};

const PING_INTERVAL: Duration = Duration::from_secs(20);
const READ_DEADLINE: Duration = Duration::from_secs(40);

/// Drives one subscriber connection: forwards `rx` to the socket, answers
/// pings/keepalive, and discards everything else the client sends, per
/// spec §6's duplex-transport note. `initial` (if given) is written before
/// the loop starts, matching `routes/ws/session.go`'s immediate status
/// write.
async fn run_stream<M: Serialize + Send + 'static>(
    socket: WebSocket,
    mut rx: mpsc::UnboundedReceiver<M>,
    initial: Option<M>,
) {
    let (mut sender, mut receiver) = socket.split();

    if let Some(msg) = initial {
        if let Ok(json) = serde_json::to_string(&msg) {
            if sender.send(Message::Text(json)).await.is_err() {
                return;
            }
        }
    }

    let mut ping_ticker = interval(PING_INTERVAL);
    let mut deadline = Box::pin(sleep(READ_DEADLINE));

    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::warn!("subscriber missed its pong deadline, closing");
                break;
            }
            _ = ping_ticker.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Pong(_))) => {
                        deadline.as_mut().reset(Instant::now() + READ_DEADLINE);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    // Text/binary/ping frames are discarded; axum answers
                    // inbound pings automatically.
                    Some(Ok(_)) => {}
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Some(message) => {
                        let Ok(json) = serde_json::to_string(&message) else { continue };
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    None => break, // hub dropped our sender (disconnect_all/eviction)
                }
            }
        }
    }
}

fn replay_target(since: Option<i64>) -> Option<i64> {
    since.filter(|&s| s != -1)
}

async fn wrap_session_messages(
    mut raw_rx: mpsc::UnboundedReceiver<calendar::SessionStatus>,
    wrapped_tx: mpsc::UnboundedSender<SessionStatusMessage>,
) {
    while let Some(session) = raw_rx.recv().await {
        if wrapped_tx.send(SessionStatusMessage { session }).is_err() {
            break;
        }
    }
}

pub async fn depth_stream(
    Path(symbol): Path<String>,
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let hub = state.depth_hub_for(&symbol);
        let conn_id = uuid::Uuid::new_v4().to_string();
        let rx = hub.register(hub::BROADCAST_USER, conn_id.clone());

        if let Some(since_ms) = replay_target(query.since) {
            hub.replay_since(hub::BROADCAST_USER, &conn_id, since_ms);
        }

        run_stream(socket, rx, None).await;
        hub.unregister(hub::BROADCAST_USER, &conn_id);
    })
}

pub async fn ledger_stream(
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let conn_id = uuid::Uuid::new_v4().to_string();
        let rx = state.ledger_hub.register(hub::BROADCAST_USER, conn_id.clone());

        if let Some(since_ms) = replay_target(query.since) {
            state.ledger_hub.replay_since(hub::BROADCAST_USER, &conn_id, since_ms);
        }

        run_stream(socket, rx, None).await;
        state.ledger_hub.unregister(hub::BROADCAST_USER, &conn_id);
    })
}

pub async fn notify_stream(
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let user_id = query.user_id.unwrap_or(hub::BROADCAST_USER);
        let conn_id = uuid::Uuid::new_v4().to_string();
        let rx = state.notify_hub.register(user_id, conn_id.clone());

        if let Some(since_ms) = replay_target(query.since) {
            state.notify_hub.replay_since(user_id, &conn_id, since_ms);
        }

        run_stream(socket, rx, None).await;
        state.notify_hub.unregister(user_id, &conn_id);
    })
}

pub async fn session_stream(
    Query(query): Query<SubscribeQuery>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let conn_id = uuid::Uuid::new_v4().to_string();
        let raw_rx = state.session_hub.register(SESSION_USER_ID, conn_id.clone());

        let current = state
            .calendar
            .load()
            .map(|cfg| {
                let now = chrono::Local::now().naive_local();
                calendar::SessionStatus::from(calendar::current_session(&cfg, now))
            })
            .ok();
        let initial = current.map(|session| SessionStatusMessage { session });

        if let Some(since_ms) = replay_target(query.since) {
            state.session_hub.replay_since(SESSION_USER_ID, &conn_id, since_ms);
        }

        // The hub carries bare `SessionStatus` (the type `Scheduler` was
        // built against); wrap each one as `{"session": ...}` for the wire
        // without changing the hub's payload type.
        let (wrapped_tx, wrapped_rx) = mpsc::unbounded_channel();
        tokio::spawn(wrap_session_messages(raw_rx, wrapped_tx));

        run_stream(socket, wrapped_rx, initial).await;
        state.session_hub.unregister(SESSION_USER_ID, &conn_id);
    })
}
