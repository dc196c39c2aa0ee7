//! Table Walkthrough Example
//!
//! Deals a seeded four-seat round, arranges every hand with the suggester
//! and prints the pairwise settlement.

use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;
use thirteen::game::{Card, Deck, LaneBonuses, ScoringRules, SeatHand, SeatIndex, suggest};

fn show(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Thirteen-card Table Walkthrough ===\n");

    let mut rng = StdRng::seed_from_u64(2024);
    let hands = Deck::new().shuffled(&mut rng).deal_hands(4)?;
    let rules = ScoringRules {
        lane_bonuses: LaneBonuses::classic(),
        ..ScoringRules::default()
    };

    let mut seats: BTreeMap<SeatIndex, SeatHand> = BTreeMap::new();
    for (seat, dealt) in hands.iter().enumerate() {
        let arrangement = suggest(dealt).ok_or("suggester needs exactly 13 cards")?;
        let hand = SeatHand::evaluate(arrangement, dealt, &rules.specials)?;

        println!("Seat {seat}: dealt {}", show(dealt));
        println!("  front  {:<20} {:?}", show(&hand.arrangement.front), hand.ranks.front.category);
        println!("  middle {:<20} {:?}", show(&hand.arrangement.middle), hand.ranks.middle.category);
        println!("  back   {:<20} {:?}", show(&hand.arrangement.back), hand.ranks.back.category);
        if let Some(pattern) = hand.special {
            println!("  special: {pattern:?}");
        }
        println!();

        seats.insert(seat, hand);
    }

    let score = thirteen::game::score_room(&seats, &rules);
    println!("Pairwise results:");
    for pair in &score.pairs {
        println!(
            "  seat {} vs seat {}: {:+} ({:?})",
            pair.first, pair.second, pair.score.points, pair.score.kind
        );
    }

    println!("\nNet:");
    for (seat, points) in &score.net {
        println!("  seat {seat}: {points:+}");
    }
    println!("  (sums to {})", score.total());

    Ok(())
}
