//! Whole-hand special patterns (特殊牌型).
//!
//! A seat holding a special pattern skips lane-by-lane comparison and is
//! paid the pattern's bonus instead. Patterns are declared in ascending
//! priority, so the derived ordering is the priority table. Which pattern a
//! seat is credited with, and which of two specials wins, are both decided
//! by [`SpecialRules::strength`]: bonus first, priority on equal bonuses.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{Arrangement, Card, Points, Suit},
    functional::{combinations, is_flush, remainder, select, straight_high, value_counts},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialPattern {
    /// 六对半: six pairs plus a single; quads count as two pairs
    SixPairs,
    /// 四条六对半: six pairs where two of them are quads
    QuadsSixPairs,
    /// 三顺子: every lane is a straight
    ThreeStraight,
    /// 三同花: every lane is a flush
    ThreeFlush,
    /// 三同花顺: every lane is a straight flush
    ThreeStraightFlush,
    /// 一条龙: one of every value
    Dragon,
    /// 至尊清龙: all thirteen cards in one suit
    OneSuit,
}

impl SpecialPattern {
    pub const ALL: [SpecialPattern; 7] = [
        SpecialPattern::SixPairs,
        SpecialPattern::QuadsSixPairs,
        SpecialPattern::ThreeStraight,
        SpecialPattern::ThreeFlush,
        SpecialPattern::ThreeStraightFlush,
        SpecialPattern::Dragon,
        SpecialPattern::OneSuit,
    ];

    #[must_use]
    pub const fn zh(self) -> &'static str {
        match self {
            Self::SixPairs => "六对半",
            Self::QuadsSixPairs => "四条六对半",
            Self::ThreeStraight => "三顺子",
            Self::ThreeFlush => "三同花",
            Self::ThreeStraightFlush => "三同花顺",
            Self::Dragon => "一条龙",
            Self::OneSuit => "至尊清龙",
        }
    }

    /// Whether the pattern depends on how the cards are split into lanes.
    #[must_use]
    pub const fn needs_partition(self) -> bool {
        matches!(
            self,
            Self::ThreeStraight | Self::ThreeFlush | Self::ThreeStraightFlush
        )
    }
}

impl fmt::Display for SpecialPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::SixPairs => "six pairs",
            Self::QuadsSixPairs => "six pairs with quads",
            Self::ThreeStraight => "three straights",
            Self::ThreeFlush => "three flushes",
            Self::ThreeStraightFlush => "three straight flushes",
            Self::Dragon => "dragon",
            Self::OneSuit => "one suit",
        };
        write!(f, "{repr}")
    }
}

/// Where partition-dependent patterns are looked for.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Any 3/5/5 split of the dealt cards counts.
    #[default]
    Deal,
    /// Only the lanes the player actually submitted count.
    Arrangement,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SpecialBonuses {
    pub six_pairs: Points,
    pub quads_six_pairs: Points,
    pub three_straight: Points,
    pub three_flush: Points,
    pub three_straight_flush: Points,
    pub dragon: Points,
    pub one_suit: Points,
}

impl SpecialBonuses {
    #[must_use]
    pub fn get(&self, pattern: SpecialPattern) -> Points {
        match pattern {
            SpecialPattern::SixPairs => self.six_pairs,
            SpecialPattern::QuadsSixPairs => self.quads_six_pairs,
            SpecialPattern::ThreeStraight => self.three_straight,
            SpecialPattern::ThreeFlush => self.three_flush,
            SpecialPattern::ThreeStraightFlush => self.three_straight_flush,
            SpecialPattern::Dragon => self.dragon,
            SpecialPattern::OneSuit => self.one_suit,
        }
    }
}

impl Default for SpecialBonuses {
    fn default() -> Self {
        Self {
            six_pairs: 3,
            quads_six_pairs: 7,
            three_straight: 4,
            three_flush: 4,
            three_straight_flush: 20,
            dragon: 13,
            one_suit: 52,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SpecialRules {
    pub enabled: bool,
    pub source: PatternSource,
    pub bonuses: SpecialBonuses,
}

impl Default for SpecialRules {
    fn default() -> Self {
        Self {
            enabled: true,
            source: PatternSource::Deal,
            bonuses: SpecialBonuses::default(),
        }
    }
}

impl SpecialRules {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// What `pattern` pays. Never less than one.
    #[must_use]
    pub fn bonus(&self, pattern: SpecialPattern) -> Points {
        self.bonuses.get(pattern).max(1)
    }

    /// Sort key between patterns under these rules.
    #[must_use]
    pub fn strength(&self, pattern: SpecialPattern) -> (Points, SpecialPattern) {
        (self.bonus(pattern), pattern)
    }

    /// The pattern a seat is credited with, if any. `arrangement` is the
    /// seat's submitted layout; it's only consulted when partition patterns
    /// are restricted to the submission.
    #[must_use]
    pub fn detect(&self, dealt: &[Card], arrangement: &Arrangement) -> Option<SpecialPattern> {
        if !self.enabled {
            return None;
        }
        SpecialPattern::ALL
            .into_iter()
            .filter(|pattern| match (pattern.needs_partition(), self.source) {
                (true, PatternSource::Arrangement) => lanes_match(*pattern, arrangement),
                _ => holds(*pattern, dealt),
            })
            .max_by_key(|pattern| self.strength(*pattern))
    }
}

/// Detect the highest special pattern in a 13-card deal, searching every
/// possible 3/5/5 split and using the default bonus table.
#[must_use]
pub fn detect(cards: &[Card]) -> Option<SpecialPattern> {
    let rules = SpecialRules::default();
    SpecialPattern::ALL
        .into_iter()
        .filter(|pattern| holds(*pattern, cards))
        .max_by_key(|pattern| rules.strength(*pattern))
}

fn lane_fits(pattern: SpecialPattern, lane: &[Card]) -> bool {
    match pattern {
        SpecialPattern::ThreeStraight => straight_high(lane).is_some(),
        SpecialPattern::ThreeFlush => is_flush(lane),
        SpecialPattern::ThreeStraightFlush => is_flush(lane) && straight_high(lane).is_some(),
        _ => false,
    }
}

fn lanes_match(pattern: SpecialPattern, arrangement: &Arrangement) -> bool {
    arrangement.len() == 13
        && lane_fits(pattern, &arrangement.front)
        && lane_fits(pattern, &arrangement.middle)
        && lane_fits(pattern, &arrangement.back)
}

/// Whether some 3/5/5 split of `cards` has every lane fitting `pattern`.
fn partition_exists(pattern: SpecialPattern, cards: &[Card]) -> bool {
    if cards.len() != 13 {
        return false;
    }
    combinations(13, 3).iter().any(|front_idx| {
        let front = select(cards, front_idx);
        if !lane_fits(pattern, &front) {
            return false;
        }
        let rest = remainder(cards, front_idx);
        combinations(10, 5).iter().any(|middle_idx| {
            lane_fits(pattern, &select(&rest, middle_idx))
                && lane_fits(pattern, &remainder(&rest, middle_idx))
        })
    })
}

fn holds(pattern: SpecialPattern, cards: &[Card]) -> bool {
    if cards.len() != 13 {
        return false;
    }
    match pattern {
        SpecialPattern::OneSuit => Suit::ALL
            .iter()
            .any(|suit| cards.iter().all(|c| c.1 == *suit)),
        SpecialPattern::Dragon => value_counts(cards)[2..=14].iter().all(|count| *count == 1),
        SpecialPattern::SixPairs => six_pairs(cards),
        SpecialPattern::QuadsSixPairs => {
            six_pairs(cards) && value_counts(cards).contains(&4)
        }
        SpecialPattern::ThreeFlush => three_flush_by_suits(cards),
        SpecialPattern::ThreeStraight | SpecialPattern::ThreeStraightFlush => {
            partition_exists(pattern, cards)
        }
    }
}

fn six_pairs(cards: &[Card]) -> bool {
    let pairs: u8 = value_counts(cards).iter().map(|count| count / 2).sum();
    pairs == 6
}

// Flush lanes only care about suit counts, so skip the partition search.
fn three_flush_by_suits(cards: &[Card]) -> bool {
    let mut counts: Vec<usize> = Suit::ALL
        .iter()
        .map(|suit| cards.iter().filter(|c| c.1 == *suit).count())
        .filter(|count| *count > 0)
        .collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    match counts.as_slice() {
        [13] => true,
        [a, b] => (*a == 8 && *b == 5) || (*a == 10 && *b == 3),
        [5, 5, 3] => true,
        _ => false,
    }
}
