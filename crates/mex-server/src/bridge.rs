use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use mex_core::ID;
use mex_session::{Connection, ConnectionRole, ServerMessage};
use std::sync::Arc;

/// Upgrades `/ws/{key}` to a WebSocket and bridges it into the match named
/// `key` (auto-creating it if `AUTO_CREATE_MATCHES` allows). Grounded on
/// `hosting::server::enter` + `Casino::bridge`, swapping `actix_ws` for
/// Axum's native WebSocket extractor.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, key, state))
}

async fn handle_socket(socket: WebSocket, key: String, state: Arc<AppState>) {
    let session = match state.sessions.get_or_create(&key, "anonymous").await {
        Ok(session) => session,
        Err(err) => {
            let (mut sender, _) = socket.split();
            let payload = ServerMessage::Error { kind: err.kind().to_string(), message: err.to_string() };
            if let Ok(json) = serde_json::to_string(&payload) {
                let _ = sender.send(Message::Text(json)).await;
            }
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ServerMessage>();
    let connection_id: ID<Connection> = ID::default();

    {
        let mut guard = session.lock().await;
        guard.attach_connection(connection_id, tx);
        guard.send_full_state(connection_id, ConnectionRole::Pending);
    }
    log::debug!("[bridge {key}] connected as {connection_id}");

    let outbound = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&message) else { continue };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => handle_inbound_text(&state, &key, connection_id, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    outbound.abort();
    if let Some(session) = state.sessions.get(&key).await {
        session.lock().await.detach_connection(connection_id);
    }
    log::debug!("[bridge {key}] disconnected {connection_id}");
}

/// Decodes one inbound text frame and dispatches it, reporting any failure
/// — a bad envelope, an unknown type, or a rules rejection — back to the
/// originating connection only, never to the rest of the table.
async fn handle_inbound_text(state: &Arc<AppState>, key: &str, origin: ID<Connection>, text: &str) {
    let outcome = match mex_session::decode(text) {
        Ok(message) => state.sessions.dispatch(key, origin, message).await,
        Err(err) => Err(err),
    };
    if let Err(err) = outcome {
        if let Some(session) = state.sessions.get(key).await {
            let guard = session.lock().await;
            guard.unicast(origin, ServerMessage::Error { kind: err.kind().to_string(), message: err.to_string() });
        }
    }
}
