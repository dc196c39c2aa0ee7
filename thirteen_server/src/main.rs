//! Thirteen-card room server.
//!
//! Spawns room actors through a shared `RoomManager` and serves them over
//! HTTP and WebSocket.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use thirteen::{RoomConfig, RoomManager};
use thirteen_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run a Thirteen-card room server

USAGE:
  thirteen_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:6969]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND, disabled if unset]
  --rooms         N        Number of rooms to create    [default: env INITIAL_ROOMS or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  ROOM_SEATS, ROOM_ROUNDS, ROOM_STAKE_UNIT, ROOM_SPEED (normal|turbo|hyper),
  ROOM_ARRANGE_TIMEOUT_SECS, ROOM_READY_TIMEOUT_SECS, ROOM_REVEAL_SECS,
  ROOM_RETENTION_SECS, ROOM_BOTS, REAP_INTERVAL_SECS, RUST_LOG
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let metrics_bind: Option<SocketAddr> = pargs.opt_value_from_str("--metrics-bind")?;
    let num_rooms: Option<usize> = pargs.opt_value_from_str("--rooms")?;

    logging::init();

    let config = ServerConfig::from_env(bind, metrics_bind, num_rooms)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported at http://{}/metrics", addr);
    }

    let room_manager = Arc::new(RoomManager::new());

    info!("Creating {} initial room(s)...", config.num_rooms);
    for i in 0..config.num_rooms {
        let room_config = RoomConfig {
            name: format!("Room {}", i + 1),
            ..config.room_defaults.clone()
        };
        match room_manager.create_room(room_config).await {
            Ok(room_id) => {
                metrics::rooms_created_total();
                tokio::spawn(metrics::observe_room(room_manager.clone(), room_id));
                info!("Created room {} with ID {}", i + 1, room_id);
            }
            Err(e) => {
                log::error!("Failed to create room {}: {}", i + 1, e);
            }
        }
    }

    for room in room_manager.list_rooms().await {
        info!(
            "  - {} (ID: {}) - {}/{} seats, {} rounds, {} speed",
            room.name, room.id, room.seats_taken, room.seats, room.rounds, room.speed
        );
    }

    // Reclaim rooms whose actor has stopped
    let reaper_manager = room_manager.clone();
    let reap_interval = Duration::from_secs(config.reap_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(reap_interval);
        loop {
            interval.tick().await;
            reaper_manager.reap_closed().await;
            metrics::active_rooms(reaper_manager.active_room_count().await);
        }
    });

    let api_state = api::AppState {
        room_manager,
        room_defaults: Arc::new(config.room_defaults.clone()),
    };
    let app = api::create_router(api_state);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
