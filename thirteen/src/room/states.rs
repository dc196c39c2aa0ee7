//! Room phase definitions.
//!
//! Each phase is its own type; [`RoomPhase`] dispatches the per-phase rules
//! with `enum_dispatch`. Phases carry the deadline that ends them, if any.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// Serializable phase tag, used in events, views and errors.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Waiting,
    Dealing,
    Arranging,
    Submitted,
    Revealing,
    MatchComplete,
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Dealing => "dealing",
            Self::Arranging => "arranging",
            Self::Submitted => "submitted",
            Self::Revealing => "revealing",
            Self::MatchComplete => "match_complete",
        };
        write!(f, "{repr}")
    }
}

/// What each phase allows.
#[enum_dispatch]
pub trait PhaseRules {
    fn name(&self) -> PhaseName;

    /// When the phase ends on its own, if ever.
    fn deadline(&self) -> Option<Instant> {
        None
    }

    /// Whether players may take empty seats.
    fn accepts_joins(&self) -> bool {
        false
    }

    fn accepts_ready(&self) -> bool {
        false
    }

    fn accepts_arrangement(&self) -> bool {
        false
    }
}

/// Seats filling up and players readying
#[derive(Debug, Default)]
pub struct Waiting {
    /// Set once every seat is filled; unready seats are released after it
    pub(crate) ready_deadline: Option<Instant>,
}

/// Building and dealing a fresh deck
#[derive(Debug)]
pub struct Dealing {}

/// Seats arranging their cards
#[derive(Debug)]
pub struct Arranging {
    pub(crate) deadline: Instant,
}

/// Every seat is locked in, scoring pending
#[derive(Debug)]
pub struct Submitted {}

/// Results on display
#[derive(Debug)]
pub struct Revealing {
    pub(crate) until: Instant,
}

/// Read-only until reclaimed
#[derive(Debug)]
pub struct MatchComplete {
    pub(crate) reclaim_at: Instant,
}

impl PhaseRules for Waiting {
    fn name(&self) -> PhaseName {
        PhaseName::Waiting
    }

    fn deadline(&self) -> Option<Instant> {
        self.ready_deadline
    }

    fn accepts_joins(&self) -> bool {
        true
    }

    fn accepts_ready(&self) -> bool {
        true
    }
}

impl PhaseRules for Dealing {
    fn name(&self) -> PhaseName {
        PhaseName::Dealing
    }
}

impl PhaseRules for Arranging {
    fn name(&self) -> PhaseName {
        PhaseName::Arranging
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.deadline)
    }

    fn accepts_arrangement(&self) -> bool {
        true
    }
}

impl PhaseRules for Submitted {
    fn name(&self) -> PhaseName {
        PhaseName::Submitted
    }
}

impl PhaseRules for Revealing {
    fn name(&self) -> PhaseName {
        PhaseName::Revealing
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.until)
    }
}

impl PhaseRules for MatchComplete {
    fn name(&self) -> PhaseName {
        PhaseName::MatchComplete
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.reclaim_at)
    }
}

#[enum_dispatch(PhaseRules)]
#[derive(Debug)]
pub enum RoomPhase {
    Waiting,
    Dealing,
    Arranging,
    Submitted,
    Revealing,
    MatchComplete,
}

impl Default for RoomPhase {
    fn default() -> Self {
        Waiting::default().into()
    }
}
