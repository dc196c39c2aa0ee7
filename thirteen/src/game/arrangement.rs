//! Arrangement validation.
//!
//! Structural problems (wrong lane sizes, duplicates, cards the seat was
//! never dealt) are hard errors. Lane ordering problems are not: a fouled
//! arrangement is still a legal submission and is scored as a full loss.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{
    entities::{Arrangement, Card, HandRank, Lane},
    errors::{FoulError, MalformedArrangementError},
    functional::classify,
};

/// Ranks of the three lanes of an arrangement.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LaneRanks {
    pub front: HandRank,
    pub middle: HandRank,
    pub back: HandRank,
}

impl LaneRanks {
    #[must_use]
    pub fn of(arrangement: &Arrangement) -> Self {
        Self {
            front: classify(&arrangement.front),
            middle: classify(&arrangement.middle),
            back: classify(&arrangement.back),
        }
    }

    #[must_use]
    pub fn lane(&self, lane: Lane) -> &HandRank {
        match lane {
            Lane::Front => &self.front,
            Lane::Middle => &self.middle,
            Lane::Back => &self.back,
        }
    }

    /// The first ordering violation, front checked before back.
    #[must_use]
    pub fn foul(&self) -> Option<FoulError> {
        if self.front > self.middle {
            Some(FoulError::FrontOverMiddle)
        } else if self.middle > self.back {
            Some(FoulError::MiddleOverBack)
        } else {
            None
        }
    }
}

/// A structurally valid arrangement, classified.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Validation {
    pub ranks: LaneRanks,
    pub foul: Option<FoulError>,
}

impl Validation {
    #[must_use]
    pub fn is_foul(&self) -> bool {
        self.foul.is_some()
    }
}

pub type ValidationResult = Result<Validation, MalformedArrangementError>;

/// Check lane sizes and card ownership only.
pub fn check_structure(
    arrangement: &Arrangement,
    dealt: &[Card],
) -> Result<(), MalformedArrangementError> {
    for lane in Lane::ALL {
        let actual = arrangement.lane(lane).len();
        if actual != lane.size() {
            return Err(MalformedArrangementError::LaneSize {
                lane,
                expected: lane.size(),
                actual,
            });
        }
    }

    let dealt: BTreeSet<&Card> = dealt.iter().collect();
    let mut seen = BTreeSet::new();
    for card in arrangement.cards() {
        if !seen.insert(card) {
            return Err(MalformedArrangementError::DuplicateCard(*card));
        }
        if !dealt.contains(card) {
            return Err(MalformedArrangementError::ForeignCard(*card));
        }
    }
    Ok(())
}

/// Validate an arrangement against the cards dealt to the seat.
///
/// With 13 distinct cards, all drawn from a 13-card deal, the union of the
/// lanes is exactly the dealt hand.
pub fn validate(arrangement: &Arrangement, dealt: &[Card]) -> ValidationResult {
    check_structure(arrangement, dealt)?;
    let ranks = LaneRanks::of(arrangement);
    let foul = ranks.foul();
    Ok(Validation { ranks, foul })
}
