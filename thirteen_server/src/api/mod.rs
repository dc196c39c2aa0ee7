//! HTTP/WebSocket API for the room server.
//!
//! # Modules
//!
//! - [`rooms`]: Room directory and seat operations
//! - [`websocket`]: Live room events and in-band commands
//! - [`middleware`]: Player identity extraction and request metrics
//! - [`request_id`]: Request correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                              - Health check
//! GET    /api/v1/rooms                        - List rooms
//! POST   /api/v1/rooms                        - Create room
//! GET    /api/v1/rooms/{id}                   - Room view (seated callers see their cards)
//! DELETE /api/v1/rooms/{id}                   - Close room
//! POST   /api/v1/rooms/{id}/join              - Take a seat (x-player-id)
//! POST   /api/v1/rooms/{id}/leave             - Give up the seat (x-player-id)
//! POST   /api/v1/rooms/{id}/ready             - Mark ready (x-player-id)
//! POST   /api/v1/rooms/{id}/unready           - Cancel ready before the deal (x-player-id)
//! POST   /api/v1/rooms/{id}/bots              - Seat a bot (x-player-id, seated)
//! POST   /api/v1/rooms/{id}/draft             - Save a draft (x-player-id)
//! POST   /api/v1/rooms/{id}/arrangement       - Submit an arrangement (x-player-id)
//! GET    /api/v1/rooms/{id}/suggestion        - Suggested arrangement (x-player-id)
//! GET    /api/v1/rooms/{id}/history           - Completed rounds
//! GET    /ws/{id}?player=<id>                 - WebSocket
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod middleware;
pub mod rate_limiter;
pub mod request_id;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use thirteen::{RoomConfig, RoomManager};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
    /// Settings for rooms created without them
    pub room_defaults: Arc<RoomConfig>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use thirteen_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:6969").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/{room_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/{room_id}",
            get(rooms::get_room).delete(rooms::close_room),
        )
        .route("/rooms/{room_id}/join", post(rooms::join_room))
        .route("/rooms/{room_id}/leave", post(rooms::leave_room))
        .route("/rooms/{room_id}/ready", post(rooms::ready))
        .route("/rooms/{room_id}/unready", post(rooms::unready))
        .route("/rooms/{room_id}/bots", post(rooms::add_bot))
        .route("/rooms/{room_id}/draft", post(rooms::save_draft))
        .route("/rooms/{room_id}/arrangement", post(rooms::submit_arrangement))
        .route("/rooms/{room_id}/suggestion", get(rooms::suggestion))
        .route("/rooms/{room_id}/history", get(rooms::history))
        .route_layer(axum::middleware::from_fn(middleware::metrics_middleware))
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","rooms":{"active_count":1},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.room_manager.active_room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": room_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
