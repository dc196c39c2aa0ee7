//! Room actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::{
    config::RoomSpeed,
    errors::{RoomId, RoomResult, SeatTimeoutError},
    state_machine::RoundResult,
    states::PhaseName,
};
use crate::game::{
    arrangement::Validation,
    entities::{Arrangement, Card, PlayerId, Points, SeatIndex},
    errors::FoulError,
};

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Take the first free seat
    Join {
        player: PlayerId,
        response: oneshot::Sender<RoomResult<SeatIndex>>,
    },

    /// Give up a seat
    Leave {
        seat: SeatIndex,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Mark a seat ready to start
    Ready {
        seat: SeatIndex,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Take back a ready flag before the deal
    Unready {
        seat: SeatIndex,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Seat a bot in the first free seat
    AddBot {
        response: oneshot::Sender<RoomResult<SeatIndex>>,
    },

    /// Lock in an arrangement for the current round
    SubmitArrangement {
        seat: SeatIndex,
        arrangement: Arrangement,
        response: oneshot::Sender<RoomResult<Validation>>,
    },

    /// Save a work-in-progress arrangement
    SaveDraft {
        seat: SeatIndex,
        arrangement: Arrangement,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Transport for the seat dropped
    Disconnect { seat: SeatIndex },

    /// Transport for the seat came back
    Reconnect {
        seat: SeatIndex,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Which seat a player holds
    FindSeat {
        player: PlayerId,
        response: oneshot::Sender<Option<SeatIndex>>,
    },

    /// Room view, from a seat's point of view or a spectator's
    GetView {
        seat: Option<SeatIndex>,
        response: oneshot::Sender<RoomView>,
    },

    /// Directory entry for the room
    GetSummary {
        response: oneshot::Sender<RoomSummary>,
    },

    /// Suggested arrangement of a seat's dealt cards
    Suggest {
        seat: SeatIndex,
        response: oneshot::Sender<RoomResult<Arrangement>>,
    },

    /// Every completed round so far
    GetHistory {
        response: oneshot::Sender<Vec<RoundResult>>,
    },

    /// Stop the room
    Close { response: oneshot::Sender<()> },

    /// Subscribe to room events
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<RoomEvent>,
    },

    /// Unsubscribe from room events
    Unsubscribe { subscriber_id: Uuid },
}

/// Events published to subscribers
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    PlayerJoined {
        seat: SeatIndex,
        player: PlayerId,
    },
    PlayerLeft {
        seat: SeatIndex,
        player: PlayerId,
    },
    PlayerReady {
        seat: SeatIndex,
    },
    PlayerUnready {
        seat: SeatIndex,
    },
    /// Released for staying unready past the ready deadline
    SeatReleased {
        seat: SeatIndex,
        player: PlayerId,
    },
    PlayerDisconnected {
        seat: SeatIndex,
    },
    PlayerReconnected {
        seat: SeatIndex,
    },
    ArrangementSubmitted {
        seat: SeatIndex,
        foul: Option<FoulError>,
    },
    SeatTimedOut(SeatTimeoutError),
    RoomStateChanged {
        from: PhaseName,
        to: PhaseName,
    },
    RoundCompleted(RoundResult),
    MatchCompleted {
        standings: Vec<Standing>,
    },
}

/// Cumulative score for a seat
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub seat: SeatIndex,
    pub player: PlayerId,
    pub points: Points,
    /// `points` weighted by the room's stake unit
    pub stake_total: Points,
}

/// Public state of one seat
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub seat: SeatIndex,
    pub player: Option<PlayerId>,
    pub ready: bool,
    pub connected: bool,
    pub submitted: bool,
    pub points: Points,
    pub bot: bool,
}

/// A room as seen by one seat. Only the viewer's own cards are included;
/// other hands appear once they're in a round result.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomView {
    pub room_id: RoomId,
    pub name: String,
    pub phase: PhaseName,
    pub round: u32,
    pub rounds: u32,
    /// Seconds until the current phase times out
    pub deadline_secs: Option<u64>,
    pub seats: Vec<SeatView>,
    pub your_seat: Option<SeatIndex>,
    pub your_cards: Vec<Card>,
    pub your_draft: Option<Arrangement>,
    pub your_submission: Option<Arrangement>,
    pub last_result: Option<RoundResult>,
    pub standings: Vec<Standing>,
}

/// Room directory entry
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub seats_taken: usize,
    pub seats: usize,
    pub phase: PhaseName,
    pub round: u32,
    pub rounds: u32,
    pub speed: RoomSpeed,
}
