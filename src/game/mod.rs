//! Pure poker table engine.
//!
//! This module contains the synchronous core: card and deck primitives,
//! seat/player records, and the betting-round state machine. Nothing in here
//! touches the async runtime or the wallet; the actor layer in
//! [`crate::table`] drives it.

pub mod constants;
pub mod entities;
pub mod errors;
pub mod table;

pub use errors::{GameError, GameResult};
pub use table::{ActionOutcome, EndReason, HandEnd, HandStart, Table, TableRules, TableStatus};
