//! # Thirteen
//!
//! A Thirteen-card (十三水) rule engine and room orchestrator.
//!
//! Every seat is dealt 13 cards from a single 52-card deck and splits them
//! into three lanes: a 3-card front, a 5-card middle and a 5-card back. The
//! lanes must not weaken from back to front, or the hand fouls. Seats are
//! then scored pairwise, lane by lane, with bonuses for sweeps, home runs
//! and special whole-hand patterns.
//!
//! ## Core Modules
//!
//! - [`game`]: Pure rules. Dealing, classification, validation, special
//!   patterns, scoring and arrangement suggestion.
//! - [`room`]: Room state machine run as an async actor, plus the manager
//!   that spawns and routes to rooms.
//!
//! ## Example
//!
//! ```
//! use thirteen::{Arrangement, Card, classify, validate};
//!
//! let parse = |s: &str| -> Vec<Card> {
//!     s.split_whitespace().map(|c| c.parse().unwrap()).collect()
//! };
//! let arrangement = Arrangement::new(
//!     parse("2s 3h 4d"),
//!     parse("6s 6h 8d 9c 10c"),
//!     parse("Ks Kh Kd 3c 7c"),
//! );
//! let dealt: Vec<Card> = arrangement.cards().copied().collect();
//!
//! let validation = validate(&arrangement, &dealt).unwrap();
//! assert!(!validation.is_foul());
//! assert!(classify(&arrangement.back) > classify(&arrangement.middle));
//! ```

/// Pure rule engine.
pub mod game;
pub use game::{
    Arrangement, Card, Deck, FoulError, HandCategory, HandRank, InsufficientCardsError, Lane,
    MalformedArrangementError, PlayerId, Points, ScoringRules, SeatIndex, SpecialPattern,
    SpecialRules, Suit, Validation, Value, classify, compare_hands, constants, detect,
    score_room, suggest, validate,
};

/// Rooms, their actors and the manager.
pub mod room;
pub use room::{RoomConfig, RoomError, RoomEvent, RoomId, RoomManager, RoomResult};
