//! Room orchestration on top of the rule engine.
//!
//! Each room runs in its own Tokio task with an mpsc inbox. The
//! [`RoomActor`] owns the [`Room`] state machine and is the only thing that
//! mutates it; [`RoomManager`] spawns actors, routes requests to them and
//! reclaims rooms whose actor has stopped.
//!
//! ## Example
//!
//! ```no_run
//! use thirteen::{PlayerId, room::{RoomConfig, RoomManager}};
//!
//! # async fn demo() -> thirteen::room::RoomResult<()> {
//! let manager = RoomManager::new();
//! let room_id = manager.create_room(RoomConfig::default()).await?;
//! let seat = manager.join(room_id, PlayerId::new("alice")).await?;
//! manager.submit_ready(room_id, seat).await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod state_machine;
pub mod states;

pub use actor::{RoomActor, RoomHandle};
pub use config::{RoomConfig, RoomSpeed};
pub use errors::{
    InvalidStateTransitionError, RoomError, RoomId, RoomResult, SeatTimeoutError,
};
pub use manager::RoomManager;
pub use messages::{RoomEvent, RoomMessage, RoomSummary, RoomView, SeatView, Standing};
pub use state_machine::{Room, RoundResult, SeatOutcome};
pub use states::PhaseName;
