//! Fixed quantities of the Thirteen-card game.

use super::entities::{Points, Value};

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to every seat each round.
pub const CARDS_PER_SEAT: usize = 13;

pub const FRONT_SIZE: usize = 3;
pub const MIDDLE_SIZE: usize = 5;
pub const BACK_SIZE: usize = 5;

/// Smallest seat capacity a room may be created with.
pub const MIN_SEATS: usize = 2;

/// Largest seat capacity a room mode may declare. Modes above
/// `DECK_SIZE / CARDS_PER_SEAT` seats are still rejected when the room
/// is created because a single deck can't cover them.
pub const MAX_SEATS: usize = 8;

pub const ACE: Value = 14;
pub const LOWEST: Value = 2;

/// The five-high straight is ranked by its five, not its ace.
pub const WHEEL_HIGH: Value = 5;

/// Ceiling for the shoot and home-run multipliers.
pub const MAX_MULTIPLIER: Points = 10;

/// Ceiling for any single lane or special-pattern bonus.
pub const MAX_BONUS: Points = 1_000;
