//! Prometheus metrics for monitoring room server health and activity.
//!
//! Metrics are exposed in Prometheus text format by an exporter listening on
//! its own address, separate from the API.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration
//! - **WebSocket Metrics**: Active connections, messages sent/received
//! - **Room Metrics**: Active rooms, rounds played, submissions, fouls, timeouts

use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::Arc};
use thirteen::{
    RoomId,
    room::{RoomEvent, RoomManager},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::logging;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Adjust the active WebSocket connections gauge.
pub fn websocket_connection_opened() {
    metrics::gauge!("websocket_connections_active").increment(1.0);
    metrics::counter!("websocket_connections_total").increment(1);
}

pub fn websocket_connection_closed() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Room Metrics
// ============================================================================

/// Set current active rooms count.
pub fn active_rooms(count: usize) {
    metrics::gauge!("active_rooms").set(count as f64);
}

/// Increment rooms created counter.
pub fn rooms_created_total() {
    metrics::counter!("rooms_created_total").increment(1);
}

/// Increment rounds played counter.
pub fn rounds_completed_total() {
    metrics::counter!("rounds_completed_total").increment(1);
}

/// Increment submitted arrangements counter, labelled by outcome.
pub fn arrangements_submitted_total(foul: bool) {
    metrics::counter!("arrangements_submitted_total",
        "foul" => foul.to_string()
    )
    .increment(1);
}

/// Increment seat timeouts counter.
pub fn seat_timeouts_total() {
    metrics::counter!("seat_timeouts_total").increment(1);
}

/// Record the points moved in one round.
pub fn round_points_moved(points: i64) {
    metrics::histogram!("round_points_moved").record(points as f64);
}

/// Subscribe to a room and record its events until the room stops
pub async fn observe_room(manager: Arc<RoomManager>, room_id: RoomId) {
    let (tx, mut rx) = mpsc::channel(64);
    let subscriber_id = Uuid::new_v4();
    if let Err(e) = manager.subscribe(room_id, subscriber_id, tx).await {
        tracing::warn!(room_id = room_id, "Cannot observe room: {}", e);
        return;
    }

    while let Some(event) = rx.recv().await {
        match event {
            RoomEvent::ArrangementSubmitted { foul, .. } => {
                arrangements_submitted_total(foul.is_some());
            }
            RoomEvent::SeatTimedOut(_) => seat_timeouts_total(),
            RoomEvent::RoundCompleted(result) => {
                rounds_completed_total();
                let moved: i64 = result
                    .seats
                    .iter()
                    .map(|outcome| outcome.points.max(0))
                    .sum();
                round_points_moved(moved);
                logging::log_round_completed(room_id, &result);
            }
            _ => {}
        }
    }

    tracing::debug!(room_id = room_id, "Room observer finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        websocket_connection_opened();
        websocket_connection_closed();
        arrangements_submitted_total(true);
        active_rooms(3);
    }

    #[tokio::test]
    async fn test_observer_stops_with_room() {
        let manager = Arc::new(RoomManager::new());
        let room_id = manager
            .create_room(thirteen::RoomConfig::default())
            .await
            .unwrap();
        let observer = tokio::spawn(observe_room(manager.clone(), room_id));
        tokio::task::yield_now().await;

        manager.close_room(room_id).await.unwrap();
        observer.await.unwrap();
    }

    #[tokio::test]
    async fn test_observer_of_unknown_room_returns() {
        let manager = Arc::new(RoomManager::new());
        observe_room(manager, 99).await;
    }
}
