use crate::error::ApiError;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use confab_core::StoredMessage;
use confab_relay::{ChatOrchestrator, Listener};
use confab_store::SessionRecord;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    /// The single orchestrator both ingress paths funnel into.
    pub orchestrator: Arc<ChatOrchestrator>,
}

/// Builds the ingress router.
pub struct GatewayServer;

impl GatewayServer {
    /// Assembles the axum router over a wired orchestrator.
    pub fn build(orchestrator: Arc<ChatOrchestrator>) -> Router {
        let state = Arc::new(AppState { orchestrator });
        Router::new()
            .route("/api/chat/session", post(create_session_handler))
            .route("/api/chat/message", post(send_message_handler))
            .route("/api/chat/ws/{session_id}", get(ws_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let live_sessions = state.orchestrator.registry().session_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "service": "confab",
        "live_sessions": live_sessions,
    }))
}

#[derive(Debug, Deserialize)]
struct CreateSessionQuery {
    #[serde(default = "default_is_demo")]
    is_demo: bool,
}

fn default_is_demo() -> bool {
    true
}

async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreateSessionQuery>,
) -> Result<Json<SessionRecord>, ApiError> {
    let record = state.orchestrator.create_session(query.is_demo).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    session_id: Option<String>,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    message: StoredMessage,
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = state
        .orchestrator
        .handle_message(req.session_id, &req.content)
        .await?;
    Ok(Json(ChatResponse {
        reply: message.content.clone(),
        message,
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

/// Extracts the user text from an inbound frame. Anything malformed
/// (bad JSON, missing fields, a non-`user` type) yields `None` and is
/// silently ignored, per the wire contract.
fn parse_user_frame(text: &str) -> Option<String> {
    let frame: InboundFrame = serde_json::from_str(text).ok()?;
    (frame.kind == "user").then_some(frame.content)
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (listener, mut rx) = Listener::new();
    let listener_id = listener.id;
    state
        .orchestrator
        .registry()
        .attach(&session_id, listener)
        .await;
    info!(session_id = %session_id, listener_id = %listener_id, "WebSocket connected");

    // Forward fan-out frames from the registry channel to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Route inbound user frames through the orchestrator. The reply
    // comes back via the registry broadcast, not as a direct response.
    let orchestrator = state.orchestrator.clone();
    let recv_session_id = session_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                WsMessage::Text(text) => {
                    let Some(content) = parse_user_frame(&text) else {
                        continue;
                    };
                    if let Err(e) = orchestrator
                        .handle_message(Some(recv_session_id.clone()), &content)
                        .await
                    {
                        // Infrastructure failure on an otherwise valid
                        // message; the persistent path gets no error
                        // frame.
                        warn!(session_id = %recv_session_id, error = %e, "message handling failed");
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
    });

    // Either side ending means the client is gone. The unfinished task
    // is left running: in-flight generation must complete for whatever
    // listeners remain attached.
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    state
        .orchestrator
        .registry()
        .detach(&session_id, listener_id)
        .await;
    info!(session_id = %session_id, listener_id = %listener_id, "WebSocket disconnected");
}
