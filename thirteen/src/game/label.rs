//! Card naming.
//!
//! Three spellings are supported for every card:
//!
//! - asset names like `king_of_diamonds` (optionally with a `.svg` suffix),
//!   which is also the wire format
//! - Chinese labels like `方块K`
//! - short text like `K♦`, `Kd` or `10h`

use thiserror::Error;

use super::entities::{Card, Suit, Value};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Unrecognized card: {0:?}")]
pub struct CardParseError(pub String);

#[must_use]
pub fn value_symbol(value: Value) -> String {
    match value {
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        14 => "A".to_string(),
        v => v.to_string(),
    }
}

fn value_word(value: Value) -> String {
    match value {
        11 => "jack".to_string(),
        12 => "queen".to_string(),
        13 => "king".to_string(),
        14 => "ace".to_string(),
        v => v.to_string(),
    }
}

fn suit_word(suit: Suit) -> &'static str {
    match suit {
        Suit::Club => "clubs",
        Suit::Diamond => "diamonds",
        Suit::Heart => "hearts",
        Suit::Spade => "spades",
    }
}

fn suit_zh(suit: Suit) -> &'static str {
    match suit {
        Suit::Club => "梅花",
        Suit::Diamond => "方块",
        Suit::Heart => "红桃",
        Suit::Spade => "黑桃",
    }
}

/// `queen_of_hearts` style name.
#[must_use]
pub fn asset_name(card: &Card) -> String {
    format!("{}_of_{}", value_word(card.0), suit_word(card.1))
}

/// `红桃Q` style label.
#[must_use]
pub fn zh_label(card: &Card) -> String {
    format!("{}{}", suit_zh(card.1), value_symbol(card.0))
}

fn parse_value(s: &str) -> Option<Value> {
    let value = match s.to_ascii_lowercase().as_str() {
        "a" | "ace" | "1" => 14,
        "k" | "king" => 13,
        "q" | "queen" => 12,
        "j" | "jack" => 11,
        "t" => 10,
        other => other.parse::<Value>().ok()?,
    };
    (2..=14).contains(&value).then_some(value)
}

fn parse_suit(s: &str) -> Option<Suit> {
    let suit = match s.to_lowercase().as_str() {
        "c" | "♣" | "clubs" | "club" | "梅花" => Suit::Club,
        "d" | "♦" | "diamonds" | "diamond" | "方块" => Suit::Diamond,
        "h" | "♥" | "hearts" | "heart" | "红桃" => Suit::Heart,
        "s" | "♠" | "spades" | "spade" | "黑桃" => Suit::Spade,
        _ => return None,
    };
    Some(suit)
}

/// Parse any of the supported spellings.
pub fn parse_card(input: &str) -> Result<Card, CardParseError> {
    let err = || CardParseError(input.to_string());
    let s = input.trim();
    let s = s.strip_suffix(".svg").unwrap_or(s);

    if let Some((value, suit)) = s.split_once("_of_") {
        let value = parse_value(value).ok_or_else(err)?;
        let suit = parse_suit(suit).ok_or_else(err)?;
        return Ok(Card(value, suit));
    }

    // Chinese labels lead with the two-character suit name.
    let head: String = s.chars().take(2).collect();
    if let Some(suit) = parse_suit(&head).filter(|_| !head.is_ascii()) {
        let rest: String = s.chars().skip(2).collect();
        let value = parse_value(&rest).ok_or_else(err)?;
        return Ok(Card(value, suit));
    }

    // Short text: the suit is the final character.
    let mut chars = s.chars();
    let last = chars.next_back().ok_or_else(err)?;
    let suit = parse_suit(&last.to_string()).ok_or_else(err)?;
    let value = parse_value(chars.as_str()).ok_or_else(err)?;
    Ok(Card(value, suit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Deck;

    #[test]
    fn test_asset_names() {
        assert_eq!(asset_name(&Card(13, Suit::Diamond)), "king_of_diamonds");
        assert_eq!(asset_name(&Card(10, Suit::Club)), "10_of_clubs");
        assert_eq!(asset_name(&Card(14, Suit::Spade)), "ace_of_spades");
    }

    #[test]
    fn test_zh_labels() {
        assert_eq!(zh_label(&Card(13, Suit::Diamond)), "方块K");
        assert_eq!(zh_label(&Card(2, Suit::Heart)), "红桃2");
        assert_eq!(zh_label(&Card(14, Suit::Club)), "梅花A");
    }

    #[test]
    fn test_parse_asset_name_with_extension() {
        assert_eq!(
            parse_card("ace_of_spades.svg").unwrap(),
            Card(14, Suit::Spade)
        );
        assert_eq!(parse_card("jack_of_hearts").unwrap(), Card(11, Suit::Heart));
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(parse_card("AS").unwrap(), Card(14, Suit::Spade));
        assert_eq!(parse_card("10h").unwrap(), Card(10, Suit::Heart));
        assert_eq!(parse_card("T♥").unwrap(), Card(10, Suit::Heart));
        assert_eq!(parse_card("K♦").unwrap(), Card(13, Suit::Diamond));
        assert_eq!(parse_card(" 2c ").unwrap(), Card(2, Suit::Club));
    }

    #[test]
    fn test_parse_zh_label() {
        assert_eq!(parse_card("方块K").unwrap(), Card(13, Suit::Diamond));
        assert_eq!(parse_card("黑桃10").unwrap(), Card(10, Suit::Spade));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_card("").is_err());
        assert!(parse_card("15s").is_err());
        assert!(parse_card("Zs").is_err());
        assert!(parse_card("king_of_cups").is_err());
    }

    #[test]
    fn test_every_spelling_parses_back() {
        for card in Deck::new().cards() {
            assert_eq!(parse_card(&asset_name(card)).unwrap(), *card);
            assert_eq!(parse_card(&zh_label(card)).unwrap(), *card);
            assert_eq!(parse_card(&card.to_string()).unwrap(), *card);
        }
    }
}
