use super::state::AppState;
use crate::relay::{RelaySession, TransportMode};
use axum::{
    extract::ws::WebSocketUpgrade,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Frame delivery mode: "json" (default) or "text"
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /healthz
/// Ready to relay: both the upstream endpoint and a credential are set
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let ok = !state.config.realtime.api_key.is_empty() && !state.config.realtime.url.is_empty();
    Json(HealthResponse { ok })
}

/// GET /ws?mode=json|text
/// Upgrade the connection and run a relay session over it
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let mode = TransportMode::parse(params.mode.as_deref());

    ws.on_upgrade(move |socket| async move {
        let session = RelaySession::new(mode, Arc::clone(&state.config), Arc::clone(&state.inspect));
        info!("Accepted client connection as {}", session.id());
        session.run(socket).await;
    })
}

/// GET /sessions
/// Summaries of recently relayed sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.inspect.summaries().await)
}

/// GET /sessions/:session_id
/// Full trace for one session, including recent transcript deltas
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.inspect.session(&session_id).await {
        Some(trace) => (StatusCode::OK, Json(trace)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}
