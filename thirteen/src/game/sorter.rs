//! Automatic arrangement.
//!
//! Tries every 3/5/5 split and keeps the strongest one that doesn't foul.
//! Strength is the summed category of the three lanes, with ties broken
//! by the back lane, then the middle, then the front.

use super::{
    arrangement::LaneRanks,
    constants::{BACK_SIZE, CARDS_PER_SEAT, MIDDLE_SIZE},
    entities::{Arrangement, Card, HandRank},
    functional::{classify, combinations, remainder, select},
};

type Strength = (u32, HandRank, HandRank, HandRank);

fn strength(ranks: &LaneRanks) -> Strength {
    let total = [&ranks.front, &ranks.middle, &ranks.back]
        .iter()
        .map(|rank| rank.category as u32)
        .sum();
    (
        total,
        ranks.back.clone(),
        ranks.middle.clone(),
        ranks.front.clone(),
    )
}

/// Suggest a non-fouling arrangement of a 13-card hand. Returns `None` for
/// anything that isn't exactly 13 cards.
#[must_use]
pub fn suggest(cards: &[Card]) -> Option<Arrangement> {
    if cards.len() != CARDS_PER_SEAT {
        return None;
    }
    let mut hand = cards.to_vec();
    hand.sort_unstable_by(|a, b| b.cmp(a));

    let mut best: Option<(Strength, Arrangement)> = None;
    for back_idx in combinations(hand.len(), BACK_SIZE) {
        let back = select(&hand, &back_idx);
        let back_rank = classify(&back);
        let rest = remainder(&hand, &back_idx);
        for middle_idx in combinations(rest.len(), MIDDLE_SIZE) {
            let middle = select(&rest, &middle_idx);
            let middle_rank = classify(&middle);
            if middle_rank > back_rank {
                continue;
            }
            let front = remainder(&rest, &middle_idx);
            let front_rank = classify(&front);
            if front_rank > middle_rank {
                continue;
            }
            let ranks = LaneRanks {
                front: front_rank,
                middle: middle_rank,
                back: back_rank.clone(),
            };
            let candidate = strength(&ranks);
            if best.as_ref().is_none_or(|(current, _)| candidate > *current) {
                best = Some((
                    candidate,
                    Arrangement::new(front, middle, back.clone()),
                ));
            }
        }
    }

    // The strongest back over all 13 cards plus the strongest middle over
    // the rest never fouls, so `best` is always set here.
    Some(
        best.map(|(_, arrangement)| arrangement)
            .unwrap_or_else(|| {
                let mut ascending = hand.clone();
                ascending.reverse();
                Arrangement::from_dealt_order(&ascending)
            }),
    )
}
