//! Rule engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Card, Lane};

/// The deck can't cover the requested deal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[error("Insufficient cards: {seats} seats x {per_seat} cards needs {}, deck has {available}", .seats * .per_seat)]
pub struct InsufficientCardsError {
    pub seats: usize,
    pub per_seat: usize,
    pub available: usize,
}

/// Structural problems with a submitted arrangement. These are rejected
/// outright; the submission never reaches scoring.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MalformedArrangementError {
    /// A lane has the wrong number of cards
    #[error("牌道数量错误: {lane} lane needs {expected} cards, got {actual}")]
    LaneSize {
        lane: Lane,
        expected: usize,
        actual: usize,
    },

    /// A card appears more than once across the lanes
    #[error("Duplicate card {0}")]
    DuplicateCard(Card),

    /// A card that wasn't dealt to the seat
    #[error("Card {0} was not dealt to this seat")]
    ForeignCard(Card),
}

/// Why an arrangement is a foul (倒水). Fouls are recorded and scored,
/// not rejected.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulError {
    /// Front lane outranks the middle lane
    #[error("倒水: front lane outranks middle lane")]
    FrontOverMiddle,

    /// Middle lane outranks the back lane
    #[error("倒水: middle lane outranks back lane")]
    MiddleOverBack,

    /// The seat never submitted and was forfeited
    #[error("倒水: seat forfeited without a valid submission")]
    Forfeit,
}
