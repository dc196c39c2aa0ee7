//! Room error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::states::PhaseName;
use crate::game::{
    entities::SeatIndex,
    errors::{InsufficientCardsError, MalformedArrangementError},
};

/// Type alias for room IDs
pub type RoomId = i64;

/// An operation arrived in a phase that doesn't accept it.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[error("Cannot {attempted} while the room is {phase}")]
pub struct InvalidStateTransitionError {
    pub phase: PhaseName,
    pub attempted: String,
}

/// A seat ran out the arranging clock. Never returned to callers; it's
/// recorded on the round result instead.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[error("Seat {seat} timed out in round {round}")]
pub struct SeatTimeoutError {
    pub seat: SeatIndex,
    pub round: u32,
}

/// Room errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RoomError {
    /// Submitted arrangement is structurally invalid
    #[error(transparent)]
    Malformed(#[from] MalformedArrangementError),

    /// Seat count can't be dealt from one deck
    #[error(transparent)]
    InsufficientCards(#[from] InsufficientCardsError),

    /// Operation not allowed in the current phase
    #[error(transparent)]
    InvalidStateTransition(#[from] InvalidStateTransitionError),

    /// Every seat is taken
    #[error("Room is full")]
    RoomFull,

    /// Player already holds a seat in this room
    #[error("Player {0} is already seated")]
    AlreadySeated(String),

    /// No player in that seat
    #[error("Seat {0} is empty")]
    EmptySeat(SeatIndex),

    /// Seat already submitted this round
    #[error("Seat {0} already submitted an arrangement")]
    AlreadySubmitted(SeatIndex),

    /// Rejected configuration
    #[error("Invalid room configuration: {0}")]
    InvalidConfig(String),

    /// No such room
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    /// Room actor has stopped
    #[error("Room {0} is closed")]
    RoomClosed(RoomId),
}

impl RoomError {
    /// Get a client-safe error message
    ///
    /// Player identities and room IDs are left out; everything else is
    /// already phrased for players.
    pub fn client_message(&self) -> String {
        match self {
            RoomError::AlreadySeated(_) => "Player is already seated".to_string(),
            RoomError::RoomNotFound(_) => "Room not found".to_string(),
            RoomError::RoomClosed(_) => "Room is closed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Lane;

    #[test]
    fn test_malformed_converts() {
        let err: RoomError = MalformedArrangementError::LaneSize {
            lane: Lane::Front,
            expected: 3,
            actual: 4,
        }
        .into();
        assert!(err.client_message().contains("牌道数量错误"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = InvalidStateTransitionError {
            phase: PhaseName::Waiting,
            attempted: "submit an arrangement".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot submit an arrangement while the room is waiting"
        );
    }

    #[test]
    fn test_client_message_redacts_ids() {
        assert_eq!(
            RoomError::AlreadySeated("alice".to_string()).client_message(),
            "Player is already seated"
        );
        assert_eq!(RoomError::RoomNotFound(42).client_message(), "Room not found");
    }
}
