use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use amora_db::models::message::ChatMessage;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(1);

/// Event envelope relayed to clients over the socket.
#[derive(Debug, Clone, Serialize)]
pub struct ChatEvent {
    pub event: &'static str,
    pub data: serde_json::Value,
}

impl ChatEvent {
    pub fn message_created(message: &ChatMessage) -> Self {
        Self {
            event: "message.created",
            data: serde_json::to_value(message).unwrap_or_default(),
        }
    }
}

/// In-process relay hub. One user may hold several live sockets (multiple
/// devices); each gets its own sender.
#[derive(Clone, Default)]
pub struct ChatHub {
    sessions: Arc<Mutex<HashMap<i64, HashMap<usize, mpsc::UnboundedSender<String>>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn connect(&self, user_id: i64) -> (usize, mpsc::UnboundedReceiver<String>) {
        let session_id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.entry(user_id).or_default().insert(session_id, tx);
        (session_id, rx)
    }

    fn disconnect(&self, user_id: i64, session_id: usize) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(user_sessions) = sessions.get_mut(&user_id) {
            user_sessions.remove(&session_id);
            if user_sessions.is_empty() {
                sessions.remove(&user_id);
            }
        }
    }

    /// Deliver an event to every live socket of a user. Dropped receivers are
    /// cleaned up on disconnect, so send failures are ignored here.
    pub fn send_to(&self, user_id: i64, event: &ChatEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        let sessions = self.sessions.lock().unwrap();
        if let Some(user_sessions) = sessions.get(&user_id) {
            for tx in user_sessions.values() {
                let _ = tx.send(payload.clone());
            }
        }
    }
}

#[derive(Deserialize)]
pub struct WsQuery {
    token: String,
}

/// GET /ws?token=... — the browser WebSocket API cannot set headers, so the
/// JWT rides in the query string.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user_id = auth::decode_user_id(&params.token, &state.config.jwt_secret)?;
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, user_id, state))
        .into_response())
}

async fn handle_socket(socket: WebSocket, user_id: i64, state: AppState) {
    let (session_id, mut rx) = state.hub.connect(user_id);
    debug!("User {} connected to relay (session {})", user_id, session_id);

    let (mut sink, mut stream) = socket.split();

    let mut forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound traffic is only pings/closes; messages are sent over REST.
    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = &mut forward => break,
        }
    }

    forward.abort();
    state.hub.disconnect(user_id, session_id);
    debug!("User {} disconnected from relay (session {})", user_id, session_id);
}
