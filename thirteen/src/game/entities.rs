use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self},
    str::FromStr,
};

use super::{
    constants::{BACK_SIZE, CARDS_PER_SEAT, DECK_SIZE, FRONT_SIZE, MIDDLE_SIZE},
    errors::InsufficientCardsError,
    label,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (two=2u8 ... ace=14u8) and a suit.
/// Aces are always stored high; the five-high straight is handled by the
/// classifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Card(pub Value, pub Suit);

impl Card {
    #[must_use]
    pub fn value(&self) -> Value {
        self.0
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", label::value_symbol(self.0), self.1)
    }
}

impl FromStr for Card {
    type Err = label::CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        label::parse_card(s)
    }
}

// Cards travel as their asset names ("queen_of_hearts") so clients can map
// them straight onto card images.
impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&label::asset_name(self))
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One of the three card groups a player arranges.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Front,
    Middle,
    Back,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Front, Lane::Middle, Lane::Back];

    /// Number of cards the lane must hold.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Front => FRONT_SIZE,
            Self::Middle => MIDDLE_SIZE,
            Self::Back => BACK_SIZE,
        }
    }

    #[must_use]
    pub const fn zh(self) -> &'static str {
        match self {
            Self::Front => "头道",
            Self::Middle => "中道",
            Self::Back => "尾道",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Front => "front",
            Self::Middle => "middle",
            Self::Back => "back",
        };
        write!(f, "{repr}")
    }
}

/// A player's split of their 13 cards into front (3), middle (5) and
/// back (5). Lane sizes aren't enforced here; the arrangement validator
/// rejects anything that isn't 3/5/5 over the dealt cards.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Arrangement {
    pub front: Vec<Card>,
    pub middle: Vec<Card>,
    pub back: Vec<Card>,
}

impl Arrangement {
    #[must_use]
    pub fn new(front: Vec<Card>, middle: Vec<Card>, back: Vec<Card>) -> Self {
        Self {
            front,
            middle,
            back,
        }
    }

    /// Split cards in the order given: the first three go to the front,
    /// the next five to the middle, the rest to the back.
    #[must_use]
    pub fn from_dealt_order(cards: &[Card]) -> Self {
        let front_end = FRONT_SIZE.min(cards.len());
        let middle_end = (FRONT_SIZE + MIDDLE_SIZE).min(cards.len());
        Self {
            front: cards[..front_end].to_vec(),
            middle: cards[front_end..middle_end].to_vec(),
            back: cards[middle_end..].to_vec(),
        }
    }

    #[must_use]
    pub fn lane(&self, lane: Lane) -> &[Card] {
        match lane {
            Lane::Front => &self.front,
            Lane::Middle => &self.middle,
            Lane::Back => &self.back,
        }
    }

    /// All cards across the three lanes, front first.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.front.iter().chain(&self.middle).chain(&self.back)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.front.len() + self.middle.len() + self.back.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |cards: &[Card]| {
            cards
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(
            f,
            "{} | {} | {}",
            join(&self.front),
            join(&self.middle),
            join(&self.back)
        )
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandCategory {
    #[must_use]
    pub const fn zh(self) -> &'static str {
        match self {
            Self::HighCard => "乌龙",
            Self::OnePair => "对子",
            Self::TwoPair => "两对",
            Self::ThreeOfAKind => "三条",
            Self::Straight => "顺子",
            Self::Flush => "同花",
            Self::FullHouse => "葫芦",
            Self::FourOfAKind => "铁支",
            Self::StraightFlush => "同花顺",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "trips",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "quads",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Classification of a 3- or 5-card lane. Ordering compares the category
/// first, then the tie-break key lexicographically, so lanes of different
/// sizes compare the way the foul rule needs them to.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandRank {
    pub category: HandCategory,
    /// Rank groups ordered by multiplicity, then by value, highest first.
    pub key: Vec<Value>,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self
            .key
            .iter()
            .map(|v| label::value_symbol(*v))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{} [{key}]", self.category)
    }
}

/// An ordered 52-card deck. Built fresh every round and consumed by
/// [`Deck::deal`].
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A full deck in suit-major, value-ascending order.
    #[must_use]
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for value in 2..=14 {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Consume the deck and return it shuffled.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.shuffle(rng);
        self
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deal `per_seat` cards to each of `seats` seats in seat order. Seat
    /// `k` receives the `k`-th contiguous block of the deck.
    pub fn deal(
        self,
        seats: usize,
        per_seat: usize,
    ) -> Result<Vec<Vec<Card>>, InsufficientCardsError> {
        let required = seats.saturating_mul(per_seat);
        if required > self.cards.len() {
            return Err(InsufficientCardsError {
                seats,
                per_seat,
                available: self.cards.len(),
            });
        }
        Ok((0..seats)
            .map(|seat| self.cards[seat * per_seat..(seat + 1) * per_seat].to_vec())
            .collect())
    }

    /// Deal a standard 13-card allocation to each seat.
    pub fn deal_hands(self, seats: usize) -> Result<Vec<Vec<Card>>, InsufficientCardsError> {
        self.deal(seats, CARDS_PER_SEAT)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque player identity handed over by the session service.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Type alias for seat positions in a room.
pub type SeatIndex = usize;

/// Signed score units. Pairings, rounds and standings are all counted in
/// these.
pub type Points = i64;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn test_new_deck_has_52_distinct_cards() {
        let deck = Deck::new();
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(deck.len(), 52);
        assert_eq!(unique.len(), 52);
        assert!(deck.cards().iter().all(|c| (2..=14).contains(&c.0)));
    }

    #[test]
    fn test_shuffle_is_seedable() {
        let a = Deck::new().shuffled(&mut StdRng::seed_from_u64(7));
        let b = Deck::new().shuffled(&mut StdRng::seed_from_u64(7));
        let c = Deck::new().shuffled(&mut StdRng::seed_from_u64(8));
        assert_eq!(a.cards(), b.cards());
        assert_ne!(a.cards(), c.cards());
    }

    #[test]
    fn test_shuffle_keeps_all_cards() {
        let deck = Deck::new().shuffled(&mut StdRng::seed_from_u64(99));
        let unique: HashSet<_> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_deal_four_seats_uses_whole_deck() {
        let deck = Deck::new().shuffled(&mut StdRng::seed_from_u64(1));
        let order = deck.cards().to_vec();
        let hands = deck.deal_hands(4).unwrap();
        assert_eq!(hands.len(), 4);
        assert!(hands.iter().all(|h| h.len() == 13));
        let dealt: Vec<Card> = hands.concat();
        assert_eq!(dealt, order);
    }

    #[test]
    fn test_deal_two_seats() {
        let hands = Deck::new().deal_hands(2).unwrap();
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].len(), 13);
        assert_eq!(hands[1].len(), 13);
        assert!(hands[0].iter().all(|c| !hands[1].contains(c)));
    }

    #[test]
    fn test_deal_zero_per_seat_gives_empty_hands() {
        let hands = Deck::new().deal(3, 0).unwrap();
        assert_eq!(hands.len(), 3);
        assert!(hands.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_deal_five_seats_fails() {
        let err = Deck::new().deal_hands(5).unwrap_err();
        assert_eq!(err.seats, 5);
        assert_eq!(err.per_seat, 13);
        assert_eq!(err.available, 52);
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(10, Suit::Heart).to_string(), "10♥");
        assert_eq!(Card(2, Suit::Club).to_string(), "2♣");
    }

    #[test]
    fn test_card_serde_uses_asset_name() {
        let card = Card(12, Suit::Heart);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"queen_of_hearts\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn test_arrangement_from_dealt_order() {
        let cards = Deck::new().deal_hands(1).unwrap().remove(0);
        let arrangement = Arrangement::from_dealt_order(&cards);
        assert_eq!(arrangement.front.len(), 3);
        assert_eq!(arrangement.middle.len(), 5);
        assert_eq!(arrangement.back.len(), 5);
        assert_eq!(arrangement.cards().copied().collect::<Vec<_>>(), cards);
    }

    #[test]
    fn test_arrangement_from_short_input() {
        let cards = vec![Card(2, Suit::Club), Card(3, Suit::Club)];
        let arrangement = Arrangement::from_dealt_order(&cards);
        assert_eq!(arrangement.front.len(), 2);
        assert!(arrangement.middle.is_empty());
        assert!(arrangement.back.is_empty());
    }

    #[test]
    fn test_lane_sizes() {
        assert_eq!(Lane::Front.size(), 3);
        assert_eq!(Lane::Middle.size(), 5);
        assert_eq!(Lane::Back.size(), 5);
    }

    #[test]
    fn test_category_ordering() {
        assert!(HandCategory::HighCard < HandCategory::OnePair);
        assert!(HandCategory::OnePair < HandCategory::TwoPair);
        assert!(HandCategory::TwoPair < HandCategory::ThreeOfAKind);
        assert!(HandCategory::ThreeOfAKind < HandCategory::Straight);
        assert!(HandCategory::Straight < HandCategory::Flush);
        assert!(HandCategory::Flush < HandCategory::FullHouse);
        assert!(HandCategory::FullHouse < HandCategory::FourOfAKind);
        assert!(HandCategory::FourOfAKind < HandCategory::StraightFlush);
    }

    #[test]
    fn test_hand_rank_category_dominates() {
        let two_pair = HandRank {
            category: HandCategory::TwoPair,
            key: vec![5, 4, 3],
        };
        let one_pair = HandRank {
            category: HandCategory::OnePair,
            key: vec![14, 13, 12, 11],
        };
        assert!(two_pair > one_pair);
    }

    #[test]
    fn test_hand_rank_shorter_key_loses_tie() {
        // A front pair of kings with a five kicker against a middle pair of
        // kings with a queen kicker.
        let front = HandRank {
            category: HandCategory::OnePair,
            key: vec![13, 5],
        };
        let middle = HandRank {
            category: HandCategory::OnePair,
            key: vec![13, 12, 11, 3],
        };
        assert!(front < middle);
    }

    #[test]
    fn test_player_id_trims() {
        assert_eq!(PlayerId::new("  alice "), PlayerId::new("alice"));
        assert_eq!(PlayerId::from("bob").as_str(), "bob");
    }
}
