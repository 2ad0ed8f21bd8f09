//! Multi-table support with an async actor per table.
//!
//! This module implements:
//! - [`TableActor`]: async actor owning a single [`crate::game::Table`]
//! - [`TableRegistry`]: owner of all live tables by id
//! - Message-based communication with tokio channels
//! - Turn-timeout and settlement scheduling
//!
//! ## Architecture
//!
//! Each table runs in a separate tokio task with an mpsc inbox, so every
//! action on a table is fully applied before the next one is accepted. The
//! turn-timeout countdown is a deadline owned by the same loop: when it
//! fires, the actor synthesizes a fold only if the timed player is still the
//! one to act, which makes the "real action wins" race correct by
//! construction.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::{BlindPost, TableEvent, TableMessage, TableResponse, TableStateResponse};
pub use registry::{TableMetadata, TableRegistry};
