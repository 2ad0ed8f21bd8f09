//! Wallet error types.

use thiserror::Error;

use crate::game::entities::Chips;

/// Wallet errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WalletError {
    /// No account exists for the player
    #[error("no wallet account for player {0}")]
    UnknownAccount(String),

    /// Insufficient balance for a debit
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Chips, required: Chips },

    /// Zero-amount entries are never recorded
    #[error("invalid amount: {0}")]
    InvalidAmount(Chips),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
