//! Core game entities: cards, the deck, seated players, and actions.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::DECK_SIZE;
use super::errors::{GameError, GameResult};

/// Type alias for chip amounts. All stacks, bets, and pots are whole chips.
pub type Chips = u64;

/// Verified player identity, supplied by the external auth boundary.
pub type PlayerId = String;

/// Seat position at a table.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
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

/// Card rank, 2..=14 with ace high (14).
pub type Rank = u8;

/// An immutable (rank, suit) pair.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.0 {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            v => v.to_string(),
        };
        write!(f, "{rank}{}", self.1)
    }
}

/// An ordered 52-card deck, consumed from the top as cards are dealt.
///
/// A deck is built freshly shuffled per hand and never reused across hands.
/// The shuffle is Fisher-Yates ([`SliceRandom::shuffle`]), not a
/// sort-by-random-key, so every ordering is equally likely.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a full 52-card deck in uniformly random order.
    #[must_use]
    pub fn fresh_shuffled() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in 2..=14u8 {
            for suit in Suit::ALL {
                cards.push(Card(rank, suit));
            }
        }
        cards.shuffle(&mut rand::rng());
        Self { cards }
    }

    /// Remove and return the top card.
    ///
    /// Fails with [`GameError::DeckExhausted`] on an empty deck. A hand of at
    /// most ten players consumes 25 cards, so hitting this is a scheduling
    /// bug, not a player-facing condition.
    pub fn deal(&mut self) -> GameResult<Card> {
        self.cards.pop().ok_or(GameError::DeckExhausted)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

/// A betting action submitted by (or synthesized for) a player.
///
/// The `Raise` amount is the additional chips wagered now, on top of the
/// player's current-round bet.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Check,
    Call,
    Raise(Chips),
    Fold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "checks".to_string(),
            Self::Call => "calls".to_string(),
            Self::Raise(amount) => format!("raises {amount}"),
            Self::Fold => "folds".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// Small and big blind amounts for a table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// A player seated at a table.
///
/// `stack` is the at-table chip balance, distinct from the wallet balance.
/// `bet` is the current-round contribution; the sum of all bets since the
/// last reset equals the pot. `in_hand` is false for players who joined
/// mid-hand and are dealt in from the next hand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub stack: Chips,
    pub bet: Chips,
    #[serde(skip)]
    pub hole_cards: Option<[Card; 2]>,
    pub folded: bool,
    pub in_hand: bool,
    pub last_action: Option<(Action, DateTime<Utc>)>,
}

impl Player {
    #[must_use]
    pub fn new(id: impl Into<PlayerId>, stack: Chips) -> Self {
        Self {
            id: id.into(),
            stack,
            bet: 0,
            hole_cards: None,
            folded: false,
            in_hand: false,
            last_action: None,
        }
    }

    /// A player still contesting the current hand.
    #[must_use]
    pub fn is_contesting(&self) -> bool {
        self.in_hand && !self.folded
    }

    /// Contesting with no chips left behind the bet.
    #[must_use]
    pub fn is_all_in(&self) -> bool {
        self.is_contesting() && self.stack == 0
    }
}
