//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Errors produced by the table state machine.
///
/// Validation errors (out-of-turn, folded, bet/stack violations) are rejected
/// atomically: the table is left bit-for-bit unchanged. [`GameError::DeckExhausted`]
/// is different in kind: a correctly bounded hand cannot run a 52-card deck dry,
/// so callers treat it as a fatal engine bug and log it rather than surface it
/// to players.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("table is full")]
    TableFull,
    #[error("buy-in must be between {min} and {max}")]
    InvalidBuyIn { min: Chips, max: Chips },
    #[error("player is already seated")]
    AlreadySeated,
    #[error("player is not seated at this table")]
    UnknownPlayer,
    #[error("need 2+ players")]
    NotEnoughPlayers,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("no betting round in progress")]
    NoBettingRound,
    #[error("not your turn")]
    OutOfTurn,
    #[error("player has already folded")]
    AlreadyFolded,
    #[error("cannot check, {to_call} to call")]
    CheckNotAllowed { to_call: Chips },
    #[error("wager of {amount} exceeds stack of {stack}")]
    InsufficientStack { amount: Chips, stack: Chips },
    #[error("raise to {total} must exceed the current bet of {current_bet}")]
    RaiseTooSmall { total: Chips, current_bet: Chips },
    #[error("no showdown to resolve")]
    NoShowdown,
    #[error("winner must be a non-folded player in the hand")]
    IneligibleWinner,
    #[error("no finished hand to settle")]
    NoFinishedHand,
    #[error("deck exhausted mid-hand")]
    DeckExhausted,
}

/// Result alias for engine operations.
pub type GameResult<T> = Result<T, GameError>;
