//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up alongside the server's own `tracing` events.

use thirteen::{RoomId, room::RoundResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info`.
///
/// # Example
///
/// ```no_run
/// use thirteen_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a scored round with structured data
pub fn log_round_completed(room_id: RoomId, result: &RoundResult) {
    let fouls = result
        .seats
        .iter()
        .filter(|outcome| outcome.hand.is_foul())
        .count();
    let timeouts = result
        .seats
        .iter()
        .filter(|outcome| outcome.timeout.is_some())
        .count();
    tracing::info!(
        room_id = room_id,
        round = result.round,
        seats = result.seats.len(),
        fouls = fouls,
        timeouts = timeouts,
        home_runs = result.home_runs.len(),
        "Round completed"
    );
}

/// Log API request/response
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_api_request() {
        // Just ensure it doesn't panic without a subscriber
        log_api_request("GET", "/api/v1/rooms", 200, 12);
        log_api_request("POST", "/api/v1/rooms", 201, 2500);
    }
}
