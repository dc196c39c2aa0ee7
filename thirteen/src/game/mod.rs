//! Thirteen-card rule engine.
//!
//! Everything here is pure: dealing, classification, validation, special
//! pattern detection, scoring and arrangement suggestion. None of it
//! touches room state or suspends.

pub mod arrangement;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod label;
pub mod scoring;
pub mod sorter;
pub mod special;

pub use arrangement::{LaneRanks, Validation, ValidationResult, validate};
pub use entities::{
    Arrangement, Card, Deck, HandCategory, HandRank, Lane, PlayerId, Points, SeatIndex, Suit,
    Value,
};
pub use errors::{FoulError, InsufficientCardsError, MalformedArrangementError};
pub use functional::classify;
pub use scoring::{
    LaneBonuses, PairKind, PairResult, PairScore, RoomScore, ScoringRules, SeatHand, Sweep,
    compare_hands, score_room,
};
pub use sorter::suggest;
pub use special::{PatternSource, SpecialBonuses, SpecialPattern, SpecialRules, detect};
