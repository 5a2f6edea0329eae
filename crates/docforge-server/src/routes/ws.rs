//! `/ws/{client_id}` — duplex progress feed over the Progress Bus (§4.10).
//! One socket can subscribe to many jobs at once: each `subscribe` control
//! message spawns a forwarding task that drains that job's broadcast
//! channel into a shared mpsc sink; `unsubscribe` aborts it. The client is
//! expected to reconnect with bounded retries; the server holds no state
//! keyed on `client_id` beyond the lifetime of the connection.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use tokio::sync::mpsc;

use docforge_domain::ports::ProgressEvent;
use docforge_domain::value_objects::JobId;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientControl {
    Subscribe { job_id: JobId },
    Unsubscribe { job_id: JobId },
}

pub async fn progress_ws(State(state): State<AppState>, Path(client_id): Path<String>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, client_id))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, _client_id: String) {
    let (events_tx, mut events_rx) = mpsc::channel::<ProgressEvent>(256);
    let mut subscriptions: HashMap<JobId, tokio::task::JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                let Ok(payload) = serde_json::to_string(&event) else { continue };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_control(&text, &state, &events_tx, &mut subscriptions);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    for (_, handle) in subscriptions.drain() {
        handle.abort();
    }
}

fn handle_control(
    text: &str,
    state: &AppState,
    events_tx: &mpsc::Sender<ProgressEvent>,
    subscriptions: &mut HashMap<JobId, tokio::task::JoinHandle<()>>,
) {
    let Ok(control) = serde_json::from_str::<ClientControl>(text) else { return };
    match control {
        ClientControl::Subscribe { job_id } => {
            subscriptions.entry(job_id).or_insert_with(|| spawn_forwarder(state, job_id, events_tx.clone()));
        }
        ClientControl::Unsubscribe { job_id } => {
            if let Some(handle) = subscriptions.remove(&job_id) {
                handle.abort();
            }
        }
    }
}

fn spawn_forwarder(state: &AppState, job_id: JobId, events_tx: mpsc::Sender<ProgressEvent>) -> tokio::task::JoinHandle<()> {
    let mut receiver = state.progress.subscribe(job_id);
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            if events_tx.send(event).await.is_err() {
                break;
            }
        }
    })
}
