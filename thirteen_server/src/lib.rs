//! HTTP/WebSocket server for Thirteen-card rooms.
//!
//! Rooms are run by the `thirteen` crate's [`RoomManager`](thirteen::RoomManager);
//! this crate only adds transport, configuration, logging and metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
