/// Property-based tests for hand classification and arrangement validation
///
/// These tests check the rule engine against randomly dealt hands drawn
/// from a real deck, so cards are always unique.
use proptest::prelude::*;
use thirteen::game::{
    Arrangement, Card, Deck, FoulError, HandCategory, Suit, classify, functional::is_flush,
    suggest, validate,
};

// Strategy for a shuffled full deck
fn shuffled_deck() -> impl Strategy<Value = Vec<Card>> {
    Just(Deck::new().cards().to_vec()).prop_shuffle()
}

// Strategy for `n` unique cards
fn unique_cards(n: usize) -> impl Strategy<Value = Vec<Card>> {
    shuffled_deck().prop_map(move |deck| deck[..n].to_vec())
}

// Strategy for a bijective relabelling of suits
fn suit_permutation() -> impl Strategy<Value = Vec<Suit>> {
    Just(Suit::ALL.to_vec()).prop_shuffle()
}

fn relabel(cards: &[Card], permutation: &[Suit]) -> Vec<Card> {
    cards
        .iter()
        .map(|card| {
            let idx = Suit::ALL
                .iter()
                .position(|s| *s == card.suit())
                .unwrap_or_default();
            Card(card.value(), permutation[idx])
        })
        .collect()
}

proptest! {
    #[test]
    fn test_classify_is_deterministic(cards in unique_cards(5)) {
        prop_assert_eq!(classify(&cards), classify(&cards));
    }

    #[test]
    fn test_classify_ignores_card_order(cards in unique_cards(5)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(classify(&cards), classify(&reversed));
    }

    #[test]
    fn test_suit_names_are_irrelevant(
        cards in unique_cards(5),
        permutation in suit_permutation(),
    ) {
        prop_assert_eq!(classify(&cards), classify(&relabel(&cards, &permutation)));
    }

    #[test]
    fn test_flush_is_never_ranked_below_flush(cards in unique_cards(5)) {
        if is_flush(&cards) {
            prop_assert!(classify(&cards).category >= HandCategory::Flush);
        } else {
            prop_assert!(classify(&cards).category != HandCategory::Flush);
            prop_assert!(classify(&cards).category != HandCategory::StraightFlush);
        }
    }

    #[test]
    fn test_front_lane_tops_out_at_trips(cards in unique_cards(3)) {
        let category = classify(&cards).category;
        prop_assert!(matches!(
            category,
            HandCategory::HighCard | HandCategory::OnePair | HandCategory::ThreeOfAKind
        ));
    }

    #[test]
    fn test_any_partition_of_the_deal_validates(cards in unique_cards(13)) {
        let arrangement = Arrangement::from_dealt_order(&cards);
        let validation = validate(&arrangement, &cards).unwrap();

        let front = classify(&arrangement.front);
        let middle = classify(&arrangement.middle);
        let back = classify(&arrangement.back);
        let expected = if front > middle {
            Some(FoulError::FrontOverMiddle)
        } else if middle > back {
            Some(FoulError::MiddleOverBack)
        } else {
            None
        };
        prop_assert_eq!(validation.foul, expected);
    }

    #[test]
    fn test_arrangement_is_a_permutation_of_the_deal(cards in unique_cards(13)) {
        let arrangement = Arrangement::from_dealt_order(&cards);
        let mut union: Vec<Card> = arrangement.cards().copied().collect();
        let mut dealt = cards.clone();
        union.sort();
        dealt.sort();
        prop_assert_eq!(union, dealt);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_suggestion_never_fouls(cards in unique_cards(13)) {
        let arrangement = suggest(&cards).unwrap();
        let validation = validate(&arrangement, &cards).unwrap();
        prop_assert!(!validation.is_foul(), "suggested {} fouls", arrangement);
    }
}
