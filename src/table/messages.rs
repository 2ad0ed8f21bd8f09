//! Table actor message, response, and event types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{Action, Card, Chips, PlayerId, SeatIndex};
use crate::game::errors::GameError;
use crate::game::table::{EndReason, TableStatus};

/// Messages that can be sent to a [`super::TableActor`].
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a player with a buy-in debited from their wallet
    Join {
        player_id: PlayerId,
        buy_in: Chips,
        response: oneshot::Sender<TableResponse>,
    },

    /// Unseat a player, cashing out their remaining stack
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Player betting action (check, call, raise, fold)
    TakeAction {
        player_id: PlayerId,
        action: Action,
        response: oneshot::Sender<TableResponse>,
    },

    /// Declare the showdown winner (supplied externally; hand ranking is an
    /// extension point, see DESIGN.md)
    ResolveShowdown {
        winner_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get current table state
    GetState {
        response: oneshot::Sender<TableStateResponse>,
    },

    /// Subscribe to table events
    Subscribe {
        subscriber_id: PlayerId,
        sender: mpsc::Sender<TableEvent>,
    },

    /// Unsubscribe from table events
    Unsubscribe { subscriber_id: PlayerId },

    /// Close the table
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Response from table operations.
#[derive(Debug, Clone)]
pub enum TableResponse {
    /// Operation succeeded
    Ack,

    /// Player seated
    Seated { seat: SeatIndex, stack: Chips },

    /// Engine rejected the operation; no state was changed
    Rejected(GameError),

    /// Wallet rejected the buy-in; no state was changed
    WalletRejected(String),

    /// Anything else (table closed, channel failure)
    Error(String),
}

impl TableResponse {
    /// Check if response is a success
    pub fn is_success(&self) -> bool {
        matches!(self, TableResponse::Ack | TableResponse::Seated { .. })
    }

    /// Get error message if response is a failure
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Ack | TableResponse::Seated { .. } => None,
            TableResponse::Rejected(e) => Some(e.to_string()),
            TableResponse::WalletRejected(msg) | TableResponse::Error(msg) => Some(msg.clone()),
        }
    }
}

/// Table state response for `getState`.
#[derive(Debug, Clone, Serialize)]
pub struct TableStateResponse {
    pub table_id: String,
    pub table_name: String,
    pub status: TableStatus,
    pub player_count: usize,
    pub max_players: usize,
    pub players: Vec<PlayerId>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub pot: Chips,
    pub current_bet: Chips,
    pub community_cards: Vec<Card>,
    pub button: SeatIndex,
    pub to_act: Option<PlayerId>,
    pub hand_no: u64,
}

/// A posted blind, as carried by [`TableEvent::GameStarted`].
#[derive(Debug, Clone, Serialize)]
pub struct BlindPost {
    pub player_id: PlayerId,
    pub amount: Chips,
}

/// One event per observable table transition, broadcast to subscribers.
///
/// Delivery is fire-and-forget and ordered within a table (events are
/// emitted by the single actor loop). Serialized tags match the wire names
/// clients key on (`player_joined`, `game_started`, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    PlayerJoined {
        player_id: PlayerId,
        seat: SeatIndex,
        stack: Chips,
    },
    GameStarted {
        hand_no: u64,
        button: SeatIndex,
        small_blind: BlindPost,
        big_blind: BlindPost,
    },
    ActionRequired {
        player_id: PlayerId,
        to_call: Chips,
        pot: Chips,
        current_bet: Chips,
    },
    CommunityCardsDealt {
        cards: Vec<Card>,
    },
    GameFinished {
        winner: Option<PlayerId>,
        pot: Chips,
        reason: EndReason,
    },
    ReadyForNextHand {
        player_count: usize,
    },
    PlayerLeft {
        player_id: PlayerId,
        cashed_out: Chips,
    },
}
