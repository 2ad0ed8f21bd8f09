//! Engine-wide constants.

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Hole cards dealt to each player at the start of a hand.
pub const HOLE_CARDS: usize = 2;

/// Community cards dealt for the showdown.
pub const COMMUNITY_CARDS: usize = 5;

/// Hard cap on seats per table. A 52-card deck can never be exhausted by a
/// hand of this size (10 * 2 + 5 = 25 cards).
pub const MAX_PLAYERS: usize = 10;

/// Default seconds a player has to act before a fold is synthesized.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;

/// Default seconds between a hand finishing and the table resetting.
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 3;

/// Default stakes and buy-in bounds.
pub const DEFAULT_SMALL_BLIND: u64 = 1;
pub const DEFAULT_BIG_BLIND: u64 = 2;
pub const DEFAULT_MIN_BUY_IN_BB: u32 = 20;
pub const DEFAULT_MAX_BUY_IN_BB: u32 = 100;
