//! Room configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::RoomError;
use crate::game::{
    constants::{CARDS_PER_SEAT, DECK_SIZE, MAX_BONUS, MAX_MULTIPLIER, MAX_SEATS, MIN_SEATS},
    entities::Points,
    errors::InsufficientCardsError,
    scoring::ScoringRules,
    special::SpecialPattern,
};

/// Room speed presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomSpeed {
    #[default]
    Normal,
    Turbo,
    Hyper,
}

impl std::fmt::Display for RoomSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomSpeed::Normal => write!(f, "normal"),
            RoomSpeed::Turbo => write!(f, "turbo"),
            RoomSpeed::Hyper => write!(f, "hyper"),
        }
    }
}

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Room name
    pub name: String,

    /// Seat capacity. Play starts once every seat is filled and ready.
    pub seats: usize,

    /// Rounds in a match
    pub rounds: u32,

    /// Stake per point, used for the weighted standings
    pub stake_unit: Points,

    /// Speed preset, sets the arranging deadline
    pub speed: RoomSpeed,

    /// Explicit arranging deadline, overrides the speed preset
    pub arrange_timeout_secs: Option<u64>,

    /// Seconds unready seats may hold a full room before being released
    pub ready_timeout_secs: Option<u64>,

    /// Seconds results stay on screen before the next deal
    pub reveal_secs: u64,

    /// Seconds a finished match stays readable before it's reclaimed
    pub retention_secs: u64,

    /// Fixed shuffle seed, for replays and tests
    pub deck_seed: Option<u64>,

    /// Seats filled with bots when the room opens, for trial games
    pub bots: usize,

    /// Point values and house rules
    pub scoring: ScoringRules,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "Default Room".to_string(),
            seats: 4,
            rounds: 8,
            stake_unit: 1,
            speed: RoomSpeed::Normal,
            arrange_timeout_secs: None,
            ready_timeout_secs: Some(60),
            reveal_secs: 5,
            retention_secs: 300,
            deck_seed: None,
            bots: 0,
            scoring: ScoringRules::default(),
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.seats.saturating_mul(CARDS_PER_SEAT) > DECK_SIZE {
            return Err(InsufficientCardsError {
                seats: self.seats,
                per_seat: CARDS_PER_SEAT,
                available: DECK_SIZE,
            }
            .into());
        }

        if self.seats < MIN_SEATS || self.seats > MAX_SEATS {
            return Err(RoomError::InvalidConfig(format!(
                "Seats must be between {MIN_SEATS} and {MAX_SEATS}"
            )));
        }

        if self.rounds == 0 {
            return Err(RoomError::InvalidConfig(
                "A match needs at least one round".to_string(),
            ));
        }

        if self.stake_unit <= 0 {
            return Err(RoomError::InvalidConfig(
                "Stake unit must be positive".to_string(),
            ));
        }

        if self.bots >= self.seats {
            return Err(RoomError::InvalidConfig(
                "Bots must leave at least one seat free".to_string(),
            ));
        }

        if self.arrange_timeout_secs == Some(0) {
            return Err(RoomError::InvalidConfig(
                "Arranging timeout must be positive".to_string(),
            ));
        }

        validate_scoring(&self.scoring)
    }

    /// Get the arranging deadline based on room speed
    pub fn arrange_timeout(&self) -> Duration {
        let secs = self.arrange_timeout_secs.unwrap_or(match self.speed {
            RoomSpeed::Normal => 90,
            RoomSpeed::Turbo => 45,
            RoomSpeed::Hyper => 20,
        });
        Duration::from_secs(secs)
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        self.ready_timeout_secs.map(Duration::from_secs)
    }

    pub fn reveal_duration(&self) -> Duration {
        Duration::from_secs(self.reveal_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

/// Every bonus must pay at least one point, and nothing may be large
/// enough to overflow a round's settlement.
fn validate_scoring(scoring: &ScoringRules) -> Result<(), RoomError> {
    let multipliers = [
        ("shoot_multiplier", scoring.shoot_multiplier),
        ("home_run_multiplier", scoring.home_run_multiplier),
    ];
    for (name, multiplier) in multipliers {
        if !(1..=MAX_MULTIPLIER).contains(&multiplier) {
            return Err(RoomError::InvalidConfig(format!(
                "{name} must be between 1 and {MAX_MULTIPLIER}"
            )));
        }
    }

    for (name, bonus) in scoring.lane_bonuses.entries() {
        if !(1..=MAX_BONUS).contains(&bonus) {
            return Err(RoomError::InvalidConfig(format!(
                "Lane bonus {name} must be between 1 and {MAX_BONUS}"
            )));
        }
    }

    for pattern in SpecialPattern::ALL {
        let bonus = scoring.specials.bonuses.get(pattern);
        if !(1..=MAX_BONUS).contains(&bonus) {
            return Err(RoomError::InvalidConfig(format!(
                "Bonus for {pattern} must be between 1 and {MAX_BONUS}"
            )));
        }
    }

    Ok(())
}
