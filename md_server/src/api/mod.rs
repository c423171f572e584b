//! HTTP/WebSocket API.
//!
//! # Endpoints
//!
//! ```text
//! GET /health   - Server health status
//! GET /ws       - WebSocket; one participant per connection
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod rate_limiter;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use math_duel::Lobby;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub lobby: Arc<Lobby>,
}

impl AppState {
    pub fn new(lobby: Arc<Lobby>) -> Self {
        Self { lobby }
    }
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"healthy","version":"0.1.0","waiting":1,"activeSessions":3,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let waiting = state.lobby.waiting_count().await;
    let active_sessions = state.lobby.active_sessions().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "waiting": waiting,
        "activeSessions": active_sessions,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
