//! HTTP + WebSocket surface for the triage queue and queue insights.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::insights::{InsightSource, QueueInsightsClient};
use crate::pipeline::processor::triage;
use crate::pipeline::types::RawMessage;
use crate::queue::{QueueEvent, QueueFilter, TriageQueue};
use crate::source::load_messages;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<TriageQueue>,
    pub insights: Arc<dyn InsightSource>,
}

/// Load, triage and wire everything `config` describes into a router.
pub fn app_from_config(config: &AppConfig) -> Result<Router> {
    let raw = match config.messages_path.as_deref() {
        Some(path) => load_messages(path)?,
        None => {
            warn!("SUPPORT_TRIAGE_MESSAGES not set, starting with an empty queue");
            Vec::new()
        }
    };
    let queue = TriageQueue::new(triage(raw));

    let client = QueueInsightsClient::new(config.insights.clone())?;
    if !client.is_configured() {
        warn!("ANTHROPIC_API_KEY not set, queue insights will report not_configured");
    }

    Ok(routes(queue, Arc::new(client)))
}

/// Build the Axum router with queue, insights and WebSocket routes.
pub fn routes(queue: Arc<TriageQueue>, insights: Arc<dyn InsightSource>) -> Router {
    let state = AppState { queue, insights };

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/api/triage", post(triage_batch))
        .route("/api/messages", get(list_messages))
        .route("/api/messages/{id}/toggle", post(toggle_message))
        .route("/api/summary", get(summary))
        .route("/api/queue-insights", post(queue_insights))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "support-triage"
    }))
}

// ── REST ────────────────────────────────────────────────────────────────

/// Stateless triage of a posted batch. Does not touch the queue.
async fn triage_batch(Json(messages): Json<Vec<RawMessage>>) -> impl IntoResponse {
    Json(triage(messages))
}

async fn list_messages(
    State(state): State<AppState>,
    Query(filter): Query<QueueFilter>,
) -> impl IntoResponse {
    Json(state.queue.filter(&filter).await)
}

async fn toggle_message(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.queue.toggle_resolved(&id).await {
        Some(resolved) => (
            StatusCode::OK,
            Json(serde_json::json!({"id": id, "resolved": resolved})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Message not found"})),
        ),
    }
}

async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.queue.summary().await)
}

/// Insights over the whole queue, resolved messages included.
async fn queue_insights(State(state): State<AppState>) -> impl IntoResponse {
    let messages = state.queue.snapshot().await;
    let outcome = state.insights.queue_insights(&messages).await;
    info!(outcome = outcome.label(), "Queue insights requested");
    Json(outcome)
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.queue))
}

async fn send_event(socket: &mut WebSocket, event: &QueueEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize queue event");
            true
        }
    }
}

async fn handle_socket(mut socket: WebSocket, queue: Arc<TriageQueue>) {
    info!("WebSocket client connected");

    // Subscribe before the initial sync so no update is missed in between.
    let mut rx = queue.subscribe();

    let sync = QueueEvent::QueueSync {
        messages: queue.snapshot().await,
    };
    if !send_event(&mut socket, &sync).await {
        warn!("Failed to send initial sync, client disconnected");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send_event(&mut socket, &event).await {
                            debug!("Client disconnected during send");
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "WS client lagged behind broadcast");
                        let sync = QueueEvent::QueueSync {
                            messages: queue.snapshot().await,
                        };
                        if !send_event(&mut socket, &sync).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {
                        debug!("Ignoring inbound WS frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error");
                        break;
                    }
                }
            }
        }
    }
}
