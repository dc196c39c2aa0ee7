//! Player identity and request accounting middleware.
//!
//! Identity is taken from the `x-player-id` header as given; this server
//! sits behind whatever authenticates players. Handlers that act on a seat
//! take a [`Player`] and fail with `401 Unauthorized` when the header is
//! missing.
//!
//! # Extracting the Player
//!
//! ```rust,no_run
//! use thirteen_server::api::middleware::Player;
//!
//! async fn protected_handler(Player(player): Player) -> String {
//!     format!("Playing as {}", player)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    Json,
    extract::{FromRequestParts, MatchedPath, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use thirteen::PlayerId;

use super::rooms::ErrorResponse;
use crate::{logging, metrics};

/// Header carrying the caller's player identity
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// Longest accepted player identity
const MAX_PLAYER_ID_LEN: usize = 64;

/// Read a player identity from request headers, if present and sane
pub fn player_from_headers(headers: &axum::http::HeaderMap) -> Option<PlayerId> {
    headers
        .get(PLAYER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(PlayerId::new)
        .filter(|player| !player.as_str().is_empty() && player.as_str().len() <= MAX_PLAYER_ID_LEN)
}

/// The calling player, required
#[derive(Clone, Debug)]
pub struct Player(pub PlayerId);

impl<S> FromRequestParts<S> for Player
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        player_from_headers(&parts.headers).map(Player).ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: format!("Missing or invalid {PLAYER_ID_HEADER} header"),
            }),
        ))
    }
}

/// The calling player, if any; spectators have none
#[derive(Clone, Debug)]
pub struct MaybePlayer(pub Option<PlayerId>);

impl<S> FromRequestParts<S> for MaybePlayer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePlayer(player_from_headers(&parts.headers)))
    }
}

/// Record request count, duration and status for every request
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Route templates keep the label set small
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::http_requests_total(&method, &path, status);
    metrics::http_request_duration_ms(&method, &path, elapsed.as_secs_f64() * 1000.0);
    logging::log_api_request(&method, &path, status, elapsed.as_millis() as u64);

    response
}
