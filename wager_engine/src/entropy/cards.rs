use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{EntropyError, EntropyResult};

/// Number of cards in a single shuffled deck.
pub const DECK_SIZE: usize = 52;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

    /// Parse the suit names used by the remote deck service (`"HEARTS"`, ...).
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "CLUBS" => Some(Self::Club),
            "SPADES" => Some(Self::Spade),
            "DIAMONDS" => Some(Self::Diamond),
            "HEARTS" => Some(Self::Heart),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Numeric card rank. Ace is 1, numerals are themselves, jack/queen/king
/// are 11/12/13.
pub type Value = u8;

pub const ACE: Value = 1;
pub const JACK: Value = 11;
pub const QUEEN: Value = 12;
pub const KING: Value = 13;

/// A card is a tuple of a rank value (ace=1u8 ... king=13u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// Build a card, rejecting ranks outside `ACE..=KING`.
    pub fn new(value: Value, suit: Suit) -> Option<Self> {
        (ACE..=KING).contains(&value).then_some(Self(value, suit))
    }

    #[must_use]
    pub const fn rank(&self) -> Value {
        self.0
    }

    #[must_use]
    pub const fn suit(&self) -> Suit {
        self.1
    }

    /// Convert the `{value, suit}` pair returned by the remote deck service.
    pub fn from_api(value: &str, suit: &str) -> EntropyResult<Self> {
        let malformed = || EntropyError::MalformedCard {
            value: value.to_string(),
            suit: suit.to_string(),
        };
        let rank = match value.to_ascii_uppercase().as_str() {
            "ACE" => ACE,
            "JACK" => JACK,
            "QUEEN" => QUEEN,
            "KING" => KING,
            numeral => numeral.parse::<Value>().map_err(|_| malformed())?,
        };
        let suit = Suit::from_api_name(suit).ok_or_else(malformed)?;
        Self::new(rank, suit).ok_or_else(malformed)
    }

    /// Every card of a standard deck in rank-major order.
    pub fn full_deck() -> [Card; DECK_SIZE] {
        let mut cards = [Card(ACE, Suit::Club); DECK_SIZE];
        for (i, value) in (ACE..=KING).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        cards
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            ACE => "A",
            JACK => "J",
            QUEEN => "Q",
            KING => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_face_cards_from_api() {
        assert_eq!(Card::from_api("ACE", "SPADES").unwrap(), Card(1, Suit::Spade));
        assert_eq!(Card::from_api("JACK", "HEARTS").unwrap(), Card(11, Suit::Heart));
        assert_eq!(Card::from_api("QUEEN", "CLUBS").unwrap(), Card(12, Suit::Club));
        assert_eq!(Card::from_api("KING", "DIAMONDS").unwrap(), Card(13, Suit::Diamond));
    }

    #[test]
    fn test_numerals_from_api() {
        for n in 2..=10u8 {
            let card = Card::from_api(&n.to_string(), "HEARTS").unwrap();
            assert_eq!(card.rank(), n);
        }
    }

    #[test]
    fn test_malformed_cards_rejected() {
        assert!(matches!(
            Card::from_api("JOKER", "HEARTS"),
            Err(EntropyError::MalformedCard { .. })
        ));
        assert!(Card::from_api("0", "HEARTS").is_err());
        assert!(Card::from_api("14", "HEARTS").is_err());
        assert!(Card::from_api("5", "STARS").is_err());
    }

    #[test]
    fn test_full_deck_is_unique() {
        let deck = Card::full_deck();
        let unique: HashSet<_> = deck.iter().collect();
        assert_eq!(unique.len(), DECK_SIZE);
        assert!(deck.iter().all(|c| (ACE..=KING).contains(&c.rank())));
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card(1, Suit::Spade).to_string(), " A/♠");
        assert_eq!(Card(10, Suit::Heart).to_string(), "10/♥");
    }
}
