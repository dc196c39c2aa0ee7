//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use thirteen::room::{RoomConfig, RoomSpeed};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address; no exporter when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Defaults applied to rooms created at startup or over the API
    pub room_defaults: RoomConfig,
    /// Number of rooms to create on startup
    pub num_rooms: usize,
    /// How often stopped rooms are reclaimed, in seconds
    pub reap_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    /// * `num_rooms_override` - Optional number of rooms override (from CLI args)
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
        num_rooms_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_required_or("SERVER_BIND", "127.0.0.1:6969")?,
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => match std::env::var("METRICS_BIND") {
                Ok(value) => Some(value.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{value}' is not a socket address"),
                })?),
                Err(_) => None,
            },
        };

        let speed = std::env::var("ROOM_SPEED")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "normal" => Some(RoomSpeed::Normal),
                "turbo" => Some(RoomSpeed::Turbo),
                "hyper" => Some(RoomSpeed::Hyper),
                _ => None,
            })
            .unwrap_or_default();

        let defaults = RoomConfig::default();
        let room_defaults = RoomConfig {
            seats: parse_env_or("ROOM_SEATS", defaults.seats),
            rounds: parse_env_or("ROOM_ROUNDS", defaults.rounds),
            stake_unit: parse_env_or("ROOM_STAKE_UNIT", defaults.stake_unit),
            speed,
            arrange_timeout_secs: parse_env_opt("ROOM_ARRANGE_TIMEOUT_SECS")
                .or(defaults.arrange_timeout_secs),
            ready_timeout_secs: parse_env_opt("ROOM_READY_TIMEOUT_SECS")
                .or(defaults.ready_timeout_secs),
            reveal_secs: parse_env_or("ROOM_REVEAL_SECS", defaults.reveal_secs),
            retention_secs: parse_env_or("ROOM_RETENTION_SECS", defaults.retention_secs),
            bots: parse_env_or("ROOM_BOTS", defaults.bots),
            ..defaults
        };

        let num_rooms = num_rooms_override.unwrap_or_else(|| parse_env_or("INITIAL_ROOMS", 1));

        Ok(ServerConfig {
            bind,
            metrics_bind,
            room_defaults,
            num_rooms,
            reap_interval_secs: parse_env_or("REAP_INTERVAL_SECS", 30),
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room_defaults
            .validate()
            .map_err(|e| ConfigError::Invalid {
                var: "ROOM_*".to_string(),
                reason: e.to_string(),
            })?;

        if self.reap_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REAP_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Like [`parse_env_or`], but a set-yet-unparseable value is an error
fn parse_env_required_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("'{value}' could not be parsed"),
    })
}
