//! Wallet collaborator boundary.
//!
//! The engine never adds or subtracts player balances ambiently; every chip
//! crossing the table boundary is an explicit, signed, reasoned ledger entry:
//! - a `debit` with reason [`EntryReason::BuyIn`] before a seat is taken,
//! - a `credit` with reason [`EntryReason::Payout`] when a hand is won,
//! - a `credit` with reason [`EntryReason::CashOut`] when a player leaves
//!   (or is booted) with a residual stack.
//!
//! The [`WalletLedger`] trait is the seam for the real wallet service;
//! [`InMemoryLedger`] is the in-process implementation used by the registry
//! and the test suite.

pub mod errors;
pub mod ledger;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use ledger::{InMemoryLedger, WalletLedger};
pub use models::{EntryDirection, EntryReason, WalletEntry};
