//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::constants::{
    DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_BIG_BLIND, DEFAULT_MAX_BUY_IN_BB, DEFAULT_MIN_BUY_IN_BB,
    DEFAULT_SETTLE_DELAY_SECS, DEFAULT_SMALL_BLIND, MAX_PLAYERS,
};
use crate::game::entities::{Blinds, Chips};
use crate::game::table::TableRules;

/// Table configuration, read from the external table catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Display name
    pub name: String,

    /// Maximum number of seats (hard cap 10)
    pub max_players: usize,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Minimum buy-in in big blinds (e.g. 20 BB)
    pub min_buy_in_bb: u32,

    /// Maximum buy-in in big blinds (e.g. 100 BB)
    pub max_buy_in_bb: u32,

    /// How long a player may take to act before a fold is synthesized
    pub action_timeout: Duration,

    /// Pause between a hand finishing and the table resetting
    pub settle_delay: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            max_players: MAX_PLAYERS,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            min_buy_in_bb: DEFAULT_MIN_BUY_IN_BB,
            max_buy_in_bb: DEFAULT_MAX_BUY_IN_BB,
            action_timeout: Duration::from_secs(DEFAULT_ACTION_TIMEOUT_SECS),
            settle_delay: Duration::from_secs(DEFAULT_SETTLE_DELAY_SECS),
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }

        if self.max_buy_in_bb <= self.min_buy_in_bb {
            return Err("Max buy-in must be greater than min buy-in".to_string());
        }

        if self.max_players < 2 || self.max_players > MAX_PLAYERS {
            return Err(format!("Max players must be between 2 and {MAX_PLAYERS}"));
        }

        if self.action_timeout.is_zero() {
            return Err("Action timeout must be non-zero".to_string());
        }

        Ok(())
    }

    /// Get minimum buy-in in chips
    pub fn min_buy_in_chips(&self) -> Chips {
        self.big_blind * self.min_buy_in_bb as Chips
    }

    /// Get maximum buy-in in chips
    pub fn max_buy_in_chips(&self) -> Chips {
        self.big_blind * self.max_buy_in_bb as Chips
    }

    /// Stakes and bounds in the form the pure engine consumes.
    pub fn rules(&self) -> TableRules {
        TableRules {
            max_players: self.max_players,
            blinds: Blinds {
                small: self.small_blind,
                big: self.big_blind,
            },
            min_buy_in: self.min_buy_in_chips(),
            max_buy_in: self.max_buy_in_chips(),
        }
    }
}
