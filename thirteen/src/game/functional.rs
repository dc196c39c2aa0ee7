//! Pure hand classification helpers.
//!
//! Everything in here is side-effect free and total over its inputs so it
//! can be called from anywhere in the engine without error handling.

use super::{
    constants::{ACE, LOWEST, WHEEL_HIGH},
    entities::{Card, HandCategory, HandRank, Value},
};

/// Count occurrences of each value. Indexed directly by card value.
#[must_use]
pub fn value_counts(cards: &[Card]) -> [u8; 15] {
    let mut counts = [0u8; 15];
    for card in cards {
        if let Some(count) = counts.get_mut(usize::from(card.0)) {
            *count += 1;
        }
    }
    counts
}

/// Value groups ordered by multiplicity, then value, highest first.
fn groups(cards: &[Card]) -> Vec<(u8, Value)> {
    let counts = value_counts(cards);
    let mut groups: Vec<(u8, Value)> = (LOWEST..=ACE)
        .rev()
        .filter_map(|value| {
            let count = counts[usize::from(value)];
            (count > 0).then_some((count, value))
        })
        .collect();
    groups.sort_by(|a, b| b.cmp(a));
    groups
}

#[must_use]
pub fn is_flush(cards: &[Card]) -> bool {
    match cards.split_first() {
        Some((first, rest)) => rest.iter().all(|c| c.1 == first.1),
        None => false,
    }
}

/// The high card of a straight over `cards`, if they form one. Aces play
/// high or low, so both A-2-3-4-5 (high card five) and 10-J-Q-K-A count,
/// as do A-2-3 and Q-K-A for three cards.
#[must_use]
pub fn straight_high(cards: &[Card]) -> Option<Value> {
    if cards.len() < 3 {
        return None;
    }
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable();
    values.dedup();
    if values.len() != cards.len() {
        return None;
    }
    let low = values[0];
    let high = values[values.len() - 1];
    if usize::from(high - low) == values.len() - 1 {
        return Some(high);
    }
    // Ace-low: treat the ace as a one and retry.
    if high == ACE {
        let rest = &values[..values.len() - 1];
        let consecutive_from_two = rest
            .iter()
            .enumerate()
            .all(|(i, v)| usize::from(*v) == usize::from(LOWEST) + i);
        if consecutive_from_two {
            return Some(rest.last().copied().unwrap_or(WHEEL_HIGH));
        }
    }
    None
}

/// Classify a lane. Five-card hands use the full category ladder;
/// anything else only ever classifies as trips, pair or high card.
#[must_use]
pub fn classify(cards: &[Card]) -> HandRank {
    let groups = groups(cards);
    let key: Vec<Value> = groups.iter().map(|(_, value)| *value).collect();
    let shape: Vec<u8> = groups.iter().map(|(count, _)| *count).collect();

    if cards.len() == 5 {
        let flush = is_flush(cards);
        if let Some(high) = straight_high(cards) {
            let category = if flush {
                HandCategory::StraightFlush
            } else {
                HandCategory::Straight
            };
            return HandRank {
                category,
                key: vec![high],
            };
        }
        let category = match shape.as_slice() {
            [4, ..] => HandCategory::FourOfAKind,
            [3, 2] => HandCategory::FullHouse,
            _ if flush => HandCategory::Flush,
            [3, ..] => HandCategory::ThreeOfAKind,
            [2, 2, ..] => HandCategory::TwoPair,
            [2, ..] => HandCategory::OnePair,
            _ => HandCategory::HighCard,
        };
        return HandRank { category, key };
    }

    let category = match shape.as_slice() {
        [count, ..] if *count >= 3 => HandCategory::ThreeOfAKind,
        [2, ..] => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };
    HandRank { category, key }
}

/// All `k`-element index combinations of `0..n`, in lexicographic order.
#[must_use]
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k > n {
        return out;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.clone());
        // Find the rightmost index that can still move right.
        let Some(i) = (0..k).rev().find(|&i| indices[i] != i + n - k) else {
            return out;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Pick `indices` out of `cards`.
#[must_use]
pub fn select(cards: &[Card], indices: &[usize]) -> Vec<Card> {
    indices.iter().filter_map(|&i| cards.get(i).copied()).collect()
}

/// Everything in `cards` not picked by `indices`. `indices` must be sorted.
#[must_use]
pub fn remainder(cards: &[Card], indices: &[usize]) -> Vec<Card> {
    cards
        .iter()
        .enumerate()
        .filter(|(i, _)| indices.binary_search(i).is_err())
        .map(|(_, card)| *card)
        .collect()
}
