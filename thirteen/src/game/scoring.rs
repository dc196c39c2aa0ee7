//! Pairwise comparison and room scoring.
//!
//! Every pair of seats is compared exactly once. A pairing is scored from
//! the lower seat's point of view; the other seat gets the negation, which
//! keeps every round zero-sum.

use log::debug;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};

use super::{
    arrangement::{LaneRanks, check_structure, validate},
    entities::{Arrangement, Card, HandCategory, HandRank, Lane, Points, SeatIndex},
    errors::{FoulError, MalformedArrangementError},
    special::{PatternSource, SpecialPattern, SpecialRules},
};

/// What a lane win is worth when the winning lane holds a premium hand.
/// Everything not listed pays one point.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaneBonuses {
    /// 头道冲三
    pub front_trips: Points,
    /// 中道葫芦
    pub middle_full_house: Points,
    /// 中道铁支
    pub middle_quads: Points,
    /// 中道同花顺
    pub middle_straight_flush: Points,
    /// 尾道铁支
    pub back_quads: Points,
    /// 尾道同花顺
    pub back_straight_flush: Points,
}

impl LaneBonuses {
    /// Every lane win is worth one point.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            front_trips: 1,
            middle_full_house: 1,
            middle_quads: 1,
            middle_straight_flush: 1,
            back_quads: 1,
            back_straight_flush: 1,
        }
    }

    /// The common house table.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            front_trips: 3,
            middle_full_house: 2,
            middle_quads: 8,
            middle_straight_flush: 10,
            back_quads: 4,
            back_straight_flush: 5,
        }
    }

    /// Every entry with its name, for validation.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Points); 6] {
        [
            ("front_trips", self.front_trips),
            ("middle_full_house", self.middle_full_house),
            ("middle_quads", self.middle_quads),
            ("middle_straight_flush", self.middle_straight_flush),
            ("back_quads", self.back_quads),
            ("back_straight_flush", self.back_straight_flush),
        ]
    }

    /// Points for winning `lane` with `rank`. Never less than one.
    #[must_use]
    pub fn value(&self, lane: Lane, rank: &HandRank) -> Points {
        let points = match (lane, rank.category) {
            (Lane::Front, HandCategory::ThreeOfAKind) => self.front_trips,
            (Lane::Middle, HandCategory::FullHouse) => self.middle_full_house,
            (Lane::Middle, HandCategory::FourOfAKind) => self.middle_quads,
            (Lane::Middle, HandCategory::StraightFlush) => self.middle_straight_flush,
            (Lane::Back, HandCategory::FourOfAKind) => self.back_quads,
            (Lane::Back, HandCategory::StraightFlush) => self.back_straight_flush,
            _ => 1,
        };
        points.max(1)
    }
}

impl Default for LaneBonuses {
    fn default() -> Self {
        Self::flat()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScoringRules {
    pub lane_bonuses: LaneBonuses,
    /// 打枪: multiplier for winning all three lanes.
    pub shoot_multiplier: Points,
    /// Whether beating a fouled hand counts as a shoot.
    pub foul_counts_as_shoot: bool,
    /// 全垒打: extra multiplier on every pairing of a seat that shoots
    /// everyone else.
    pub home_run_multiplier: Points,
    /// Fewest opponents a home run needs.
    pub home_run_min_opponents: usize,
    pub specials: SpecialRules,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            lane_bonuses: LaneBonuses::flat(),
            shoot_multiplier: 2,
            foul_counts_as_shoot: true,
            home_run_multiplier: 2,
            home_run_min_opponents: 3,
            specials: SpecialRules::default(),
        }
    }
}

/// A seat's frozen, classified hand for one round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatHand {
    pub arrangement: Arrangement,
    pub ranks: LaneRanks,
    pub foul: Option<FoulError>,
    pub special: Option<SpecialPattern>,
}

impl SeatHand {
    /// Classify a submitted arrangement. Structural errors are returned;
    /// fouls are recorded on the hand.
    pub fn evaluate(
        arrangement: Arrangement,
        dealt: &[Card],
        specials: &SpecialRules,
    ) -> Result<Self, MalformedArrangementError> {
        let validation = validate(&arrangement, dealt)?;
        let mut special = specials.detect(dealt, &arrangement);
        // A pattern read off the submitted lanes can't survive a foul.
        if validation.foul.is_some() && specials.source == PatternSource::Arrangement {
            special = None;
        }
        Ok(Self {
            arrangement,
            ranks: validation.ranks,
            foul: validation.foul,
            special,
        })
    }

    /// The hand recorded for a seat that never submitted. Uses the draft if
    /// it's structurally sound, otherwise the cards as dealt.
    #[must_use]
    pub fn forfeit(dealt: &[Card], draft: Option<&Arrangement>) -> Self {
        let arrangement = match draft {
            Some(draft) if check_structure(draft, dealt).is_ok() => draft.clone(),
            _ => Arrangement::from_dealt_order(dealt),
        };
        Self {
            ranks: LaneRanks::of(&arrangement),
            arrangement,
            foul: Some(FoulError::Forfeit),
            special: None,
        }
    }

    #[must_use]
    pub fn is_foul(&self) -> bool {
        self.foul.is_some()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKind {
    /// At least one side held a special pattern
    Special,
    /// At least one side fouled
    Foul,
    /// Plain lane-by-lane comparison
    Lanes,
}

/// Which side of a pairing swept all three lanes.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sweep {
    #[default]
    None,
    First,
    Second,
}

impl Sweep {
    fn reversed(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Outcome of one pairing, from the first seat's point of view.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PairScore {
    pub kind: PairKind,
    /// Per-lane points before any multiplier, front to back.
    pub lanes: [Points; 3],
    pub sweep: Sweep,
    pub home_run: bool,
    pub points: Points,
}

impl PairScore {
    /// The same pairing from the other seat's point of view.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            kind: self.kind,
            lanes: self.lanes.map(|p| -p),
            sweep: self.sweep.reversed(),
            home_run: self.home_run,
            points: -self.points,
        }
    }

    fn special(points: Points) -> Self {
        Self {
            kind: PairKind::Special,
            lanes: [0; 3],
            sweep: Sweep::None,
            home_run: false,
            points,
        }
    }
}

/// `points * multiplier`, saturated so the result can still be negated.
fn scale(points: Points, multiplier: Points) -> Points {
    points.saturating_mul(multiplier.max(1)).max(-Points::MAX)
}

fn lane_total(lanes: &[Points; 3]) -> Points {
    lanes
        .iter()
        .fold(0, |acc: Points, p| acc.saturating_add(*p))
        .max(-Points::MAX)
}

fn lane_points(rules: &ScoringRules, a: &LaneRanks, b: &LaneRanks) -> [Points; 3] {
    Lane::ALL.map(|lane| {
        let (ra, rb) = (a.lane(lane), b.lane(lane));
        match ra.cmp(rb) {
            Ordering::Greater => rules.lane_bonuses.value(lane, ra),
            Ordering::Less => -rules.lane_bonuses.value(lane, rb),
            Ordering::Equal => 0,
        }
    })
}

/// Compare two hands. Precedence: special patterns, then fouls, then
/// lanes.
#[must_use]
pub fn compare_hands(a: &SeatHand, b: &SeatHand, rules: &ScoringRules) -> PairScore {
    let bonus = |pattern| rules.specials.bonus(pattern);
    match (a.special, b.special) {
        (Some(pa), Some(pb)) => {
            let strength = |pattern| rules.specials.strength(pattern);
            let points = match strength(pa).cmp(&strength(pb)) {
                Ordering::Greater => bonus(pa),
                Ordering::Less => -bonus(pb),
                Ordering::Equal => 0,
            };
            return PairScore::special(points);
        }
        (Some(pa), None) => return PairScore::special(bonus(pa)),
        (None, Some(pb)) => return PairScore::special(-bonus(pb)),
        (None, None) => {}
    }

    match (a.is_foul(), b.is_foul()) {
        (true, true) => PairScore {
            kind: PairKind::Foul,
            lanes: [0; 3],
            sweep: Sweep::None,
            home_run: false,
            points: 0,
        },
        (false, true) | (true, false) => {
            let a_fouled = a.is_foul();
            let winner = if a_fouled { &b.ranks } else { &a.ranks };
            let lanes = Lane::ALL.map(|lane| {
                let value = rules.lane_bonuses.value(lane, winner.lane(lane));
                if a_fouled { -value } else { value }
            });
            let mut points = lane_total(&lanes);
            let mut sweep = Sweep::None;
            if rules.foul_counts_as_shoot {
                points = scale(points, rules.shoot_multiplier);
                sweep = if a_fouled { Sweep::Second } else { Sweep::First };
            }
            PairScore {
                kind: PairKind::Foul,
                lanes,
                sweep,
                home_run: false,
                points,
            }
        }
        (false, false) => {
            let lanes = lane_points(rules, &a.ranks, &b.ranks);
            let mut points = lane_total(&lanes);
            let sweep = if lanes.iter().all(|p| *p > 0) {
                Sweep::First
            } else if lanes.iter().all(|p| *p < 0) {
                Sweep::Second
            } else {
                Sweep::None
            };
            if sweep != Sweep::None {
                points = scale(points, rules.shoot_multiplier);
            }
            PairScore {
                kind: PairKind::Lanes,
                lanes,
                sweep,
                home_run: false,
                points,
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PairResult {
    pub first: SeatIndex,
    pub second: SeatIndex,
    pub score: PairScore,
}

/// Scores for every pairing in a round plus the net per seat.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomScore {
    /// One entry per unordered pair, `first < second`.
    pub pairs: Vec<PairResult>,
    pub net: BTreeMap<SeatIndex, Points>,
    pub home_runs: Vec<SeatIndex>,
}

impl RoomScore {
    /// Points `seat` took from `opponent`. `points_between(i, j)` is always
    /// `-points_between(j, i)`.
    #[must_use]
    pub fn points_between(&self, seat: SeatIndex, opponent: SeatIndex) -> Option<Points> {
        self.pairs.iter().find_map(|pair| {
            if pair.first == seat && pair.second == opponent {
                Some(pair.score.points)
            } else if pair.first == opponent && pair.second == seat {
                Some(-pair.score.points)
            } else {
                None
            }
        })
    }

    /// Sum of all net scores. Zero for any scored round.
    #[must_use]
    pub fn total(&self) -> Points {
        self.net.values().sum()
    }
}

/// Score every pairing among the given seats.
#[must_use]
pub fn score_room(hands: &BTreeMap<SeatIndex, SeatHand>, rules: &ScoringRules) -> RoomScore {
    let seats: Vec<SeatIndex> = hands.keys().copied().collect();
    let mut pairs = Vec::new();
    for (i, first) in seats.iter().enumerate() {
        for second in &seats[i + 1..] {
            let score = compare_hands(&hands[first], &hands[second], rules);
            pairs.push(PairResult {
                first: *first,
                second: *second,
                score,
            });
        }
    }

    let opponents = seats.len().saturating_sub(1);
    let mut home_runs = Vec::new();
    if opponents >= rules.home_run_min_opponents.max(1) {
        for seat in &seats {
            let shoots_everyone = pairs
                .iter()
                .filter(|p| p.first == *seat || p.second == *seat)
                .all(|p| {
                    (p.first == *seat && p.score.sweep == Sweep::First)
                        || (p.second == *seat && p.score.sweep == Sweep::Second)
                });
            if shoots_everyone {
                home_runs.push(*seat);
            }
        }
        for pair in &mut pairs {
            if home_runs.contains(&pair.first) || home_runs.contains(&pair.second) {
                pair.score.points = scale(pair.score.points, rules.home_run_multiplier);
                pair.score.home_run = true;
            }
        }
    }

    let mut net: BTreeMap<SeatIndex, Points> = seats.iter().map(|s| (*s, 0)).collect();
    for pair in &pairs {
        let first = net.entry(pair.first).or_default();
        *first = first.saturating_add(pair.score.points);
        let second = net.entry(pair.second).or_default();
        *second = second.saturating_sub(pair.score.points);
    }
    debug!("scored {} pairings, home runs: {home_runs:?}", pairs.len());

    RoomScore {
        pairs,
        net,
        home_runs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(labels: &str) -> Vec<Card> {
        labels.split_whitespace().map(|s| s.parse().unwrap()).collect()
    }

    fn hand(front: &str, middle: &str, back: &str) -> SeatHand {
        let arrangement = Arrangement::new(cards(front), cards(middle), cards(back));
        let dealt: Vec<Card> = arrangement.cards().copied().collect();
        SeatHand::evaluate(arrangement, &dealt, &SpecialRules::default()).unwrap()
    }

    fn strong() -> SeatHand {
        hand("Qs Qh 2d", "Ks Kh Kd 3c 4c", "8h 9h 10h Jh Qd")
    }

    fn weak() -> SeatHand {
        hand("2s 3h 5d", "6s 6h 8d 9c 10c", "7s 7h 4c 4d Jd")
    }

    fn middling() -> SeatHand {
        hand("Ks 3s 4h", "9s 9c Jh Jc 2c", "5d 7d 10d Qd Ad")
    }

    #[test]
    fn test_two_seat_sweep_scores_shoot() {
        let rules = ScoringRules::default();
        let score = compare_hands(&strong(), &weak(), &rules);
        assert_eq!(score.kind, PairKind::Lanes);
        assert_eq!(score.lanes, [1, 1, 1]);
        assert_eq!(score.sweep, Sweep::First);
        assert_eq!(score.points, 6);
    }

    #[test]
    fn test_reversed_pairing_negates() {
        let rules = ScoringRules::default();
        let ab = compare_hands(&strong(), &weak(), &rules);
        let ba = compare_hands(&weak(), &strong(), &rules);
        assert_eq!(ab.reversed(), ba);
    }

    #[test]
    fn test_split_lanes_have_no_shoot() {
        let rules = ScoringRules::default();
        // Strong wins front and middle, middling's flush wins the back.
        let score = compare_hands(&strong(), &middling(), &rules);
        assert_eq!(score.lanes, [1, 1, -1]);
        assert_eq!(score.sweep, Sweep::None);
        assert_eq!(score.points, 1);
    }

    #[test]
    fn test_classic_lane_bonus() {
        let rules = ScoringRules {
            lane_bonuses: LaneBonuses::classic(),
            ..ScoringRules::default()
        };
        let trips_front = hand("As Ah Ad", "Ks Kh Kd Kc 2c", "8h 9h 10h Jh Qh");
        let score = compare_hands(&trips_front, &weak(), &rules);
        // 3 (front trips) + 8 (middle quads) + 5 (back straight flush), shot.
        assert_eq!(score.lanes, [3, 8, 5]);
        assert_eq!(score.points, 32);
    }

    #[test]
    fn test_foul_loses_every_lane_as_shoot() {
        let rules = ScoringRules::default();
        let fouled = hand("As Ah Ad", "2c 2d 5c 6h 8s", "9h 10h Jh Qh Kh");
        assert_eq!(fouled.foul, Some(FoulError::FrontOverMiddle));
        let score = compare_hands(&weak(), &fouled, &rules);
        assert_eq!(score.kind, PairKind::Foul);
        assert_eq!(score.lanes, [1, 1, 1]);
        assert_eq!(score.sweep, Sweep::First);
        assert_eq!(score.points, 6);
    }

    #[test]
    fn test_foul_without_shoot() {
        let rules = ScoringRules {
            foul_counts_as_shoot: false,
            ..ScoringRules::default()
        };
        let fouled = hand("As Ah Ad", "2c 2d 5c 6h 8s", "9h 10h Jh Qh Kh");
        let score = compare_hands(&fouled, &weak(), &rules);
        assert_eq!(score.points, -3);
        assert_eq!(score.sweep, Sweep::None);
    }

    #[test]
    fn test_foul_never_wins_under_negative_bonuses() {
        let rules = ScoringRules {
            lane_bonuses: LaneBonuses {
                front_trips: -1,
                middle_full_house: -1,
                middle_quads: -1,
                middle_straight_flush: -1,
                back_quads: -1,
                back_straight_flush: -1,
            },
            ..ScoringRules::default()
        };
        let fouled = hand("As Ah Ad", "2c 2d 5c 6h 8s", "9h 10h Jh Qh Kh");
        assert!(fouled.is_foul());
        let score = compare_hands(&fouled, &weak(), &rules);
        assert!(score.lanes.iter().all(|p| *p < 0));
        assert!(score.points < 0);
    }

    #[test]
    fn test_huge_multipliers_saturate() {
        let rules = ScoringRules {
            shoot_multiplier: Points::MAX,
            home_run_multiplier: Points::MAX,
            home_run_min_opponents: 1,
            ..ScoringRules::default()
        };
        let score = compare_hands(&strong(), &weak(), &rules);
        assert_eq!(score.sweep, Sweep::First);
        assert_eq!(score.points, Points::MAX);
        assert_eq!(score.reversed().points, -Points::MAX);

        let hands: BTreeMap<SeatIndex, SeatHand> =
            [(0, weak()), (1, strong())].into_iter().collect();
        let room = score_room(&hands, &rules);
        assert_eq!(room.home_runs, vec![1]);
        assert_eq!(room.net[&1], Points::MAX);
        assert_eq!(room.total(), 0);
    }

    #[test]
    fn test_foul_against_foul_is_zero() {
        let rules = ScoringRules::default();
        let a = hand("As Ah Ad", "2c 2d 5c 6h 8s", "9h 10h Jh Qh Kh");
        let b = hand("Ks Kh Kd", "3c 3d 6c 7h 9s", "9d 10d Jd Qd 4d");
        assert!(a.is_foul() && b.is_foul());
        assert_eq!(compare_hands(&a, &b, &rules).points, 0);
    }

    #[test]
    fn test_special_beats_plain_hand() {
        let rules = ScoringRules::default();
        let dragon = hand("2s 3h 4d", "5c 6s 7h 8d 9c", "10s Jh Qd Kc As");
        assert_eq!(dragon.special, Some(SpecialPattern::Dragon));
        let score = compare_hands(&dragon, &strong(), &rules);
        assert_eq!(score.kind, PairKind::Special);
        assert_eq!(score.points, 13);
        assert_eq!(compare_hands(&strong(), &dragon, &rules).points, -13);
    }

    #[test]
    fn test_equal_specials_tie() {
        let rules = ScoringRules::default();
        let a = hand("2s 3h 4d", "5c 6s 7h 8d 9c", "10s Jh Qd Kc As");
        let b = hand("2h 3d 4c", "5s 6h 7d 8c 9s", "10h Jd Qc Ks Ah");
        assert_eq!(compare_hands(&a, &b, &rules).points, 0);
    }

    #[test]
    fn test_special_against_special_follows_bonus() {
        // Dragon outranks three flushes in the priority table; a custom
        // table that pays three flushes more flips the pairing, the same
        // way it flips which pattern a seat is credited with.
        let dragon = hand("2s 3h 4d", "5c 6s 7h 8d 9c", "10s Jh Qd Kc As");
        let flushes = hand("2s 5s 9s", "3h 6h 8h Jh Kh", "2d 7d 10d Qd Ad");
        assert_eq!(flushes.special, Some(SpecialPattern::ThreeFlush));

        let rules = ScoringRules::default();
        assert_eq!(compare_hands(&dragon, &flushes, &rules).points, 13);

        let mut rules = ScoringRules::default();
        rules.specials.bonuses.three_flush = 30;
        assert_eq!(compare_hands(&dragon, &flushes, &rules).points, -30);
    }

    #[test]
    fn test_forfeit_prefers_valid_draft() {
        let dealt = cards("2s 3h 5d 6s 6h 8d 9c 10c 7s 7h 7d 4c 4d");
        let draft = Arrangement::new(
            cards("2s 3h 5d"),
            cards("6s 6h 8d 9c 10c"),
            cards("7s 7h 7d 4c 4d"),
        );
        let hand = SeatHand::forfeit(&dealt, Some(&draft));
        assert_eq!(hand.arrangement, draft);
        assert_eq!(hand.foul, Some(FoulError::Forfeit));
        assert_eq!(hand.special, None);

        let partial = Arrangement::new(cards("2s 3h"), vec![], vec![]);
        let hand = SeatHand::forfeit(&dealt, Some(&partial));
        assert_eq!(hand.arrangement, Arrangement::from_dealt_order(&dealt));
    }

    #[test]
    fn test_score_room_zero_sum_and_symmetric() {
        let rules = ScoringRules::default();
        let hands: BTreeMap<SeatIndex, SeatHand> =
            [(0, strong()), (1, weak()), (2, middling())].into_iter().collect();
        let score = score_room(&hands, &rules);
        assert_eq!(score.pairs.len(), 3);
        assert_eq!(score.total(), 0);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert_eq!(
                        score.points_between(i, j),
                        score.points_between(j, i).map(|p| -p)
                    );
                }
            }
        }
    }

    #[test]
    fn test_home_run_doubles_again() {
        let rules = ScoringRules::default();
        let best = hand("As Ah 2d", "Ks Kh Kd Kc 3c", "8h 9h 10h Jh Qh");
        let fouled = hand("Qs Qh Qd", "2c 2h 5c 6h 8s", "9d 10d Jd Qc 4d");
        let hands: BTreeMap<SeatIndex, SeatHand> =
            [(0, best), (1, weak()), (2, middling()), (3, fouled)]
                .into_iter()
                .collect();
        let score = score_room(&hands, &rules);
        assert_eq!(score.home_runs, vec![0]);
        // Each of seat 0's three pairings: 3 lanes x shoot x home run.
        assert_eq!(score.points_between(0, 1), Some(12));
        assert_eq!(score.points_between(0, 2), Some(12));
        assert_eq!(score.points_between(0, 3), Some(12));
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn test_no_home_run_with_two_opponents() {
        let rules = ScoringRules::default();
        let best = hand("As Ah 2d", "Ks Kh Kd Kc 3c", "8h 9h 10h Jh Qh");
        let hands: BTreeMap<SeatIndex, SeatHand> =
            [(0, best), (1, weak()), (2, middling())].into_iter().collect();
        let score = score_room(&hands, &rules);
        assert!(score.home_runs.is_empty());
        assert_eq!(score.points_between(0, 1), Some(6));
    }
}
