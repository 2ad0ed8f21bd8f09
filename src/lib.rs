//! # Poker Tables
//!
//! A concurrent multi-table card-game engine. Each table is an independent
//! state machine driven by an async actor: seating, blind posting, turn
//! rotation, betting legality, turn timeouts, pot accounting, and hand
//! settlement all happen behind a single per-table message queue, so actions
//! within one table are strictly sequential while different tables run fully
//! in parallel.
//!
//! ## Architecture
//!
//! - [`game`]: the pure, synchronous table state machine (cards, seats,
//!   betting round, pot). No I/O, no runtime; everything here is unit- and
//!   property-testable in isolation.
//! - [`wallet`]: the external wallet boundary, modelled as a signed
//!   debit/credit ledger behind the [`wallet::WalletLedger`] trait.
//! - [`table`]: the async layer. A [`table::TableActor`] owns one
//!   [`game::Table`] plus its turn-timeout deadline; the
//!   [`table::TableRegistry`] owns all live tables by id.
//!
//! ## Example
//!
//! ```no_run
//! use poker_tables::table::{TableConfig, TableRegistry};
//! use poker_tables::wallet::InMemoryLedger;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let wallet = Arc::new(InMemoryLedger::new());
//!     let registry = TableRegistry::new(wallet.clone());
//!
//!     wallet.open_account("alice", 1_000).await;
//!     registry
//!         .get_or_create_table("main-1", TableConfig::default())
//!         .await
//!         .unwrap();
//!     registry.join_table("main-1", "alice", 100).await.unwrap();
//! }
//! ```

/// Pure game engine: cards, seats, betting round state machine.
pub mod game;
pub use game::{
    GameError,
    entities::{Action, Card, Chips, Deck, PlayerId, SeatIndex, Suit},
    table::{Table, TableStatus},
};

/// Wallet collaborator boundary (signed debit/credit ledger).
pub mod wallet;
pub use wallet::{InMemoryLedger, WalletError, WalletLedger};

/// Async actor layer: per-table actors and the table registry.
pub mod table;
pub use table::{TableConfig, TableEvent, TableHandle, TableRegistry, TableResponse};
