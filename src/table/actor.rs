//! Table actor implementation with async message handling.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use super::config::TableConfig;
use super::messages::{BlindPost, TableEvent, TableMessage, TableResponse, TableStateResponse};
use crate::game::entities::{Action, Chips, PlayerId};
use crate::game::errors::GameError;
use crate::game::table::{ActionOutcome, HandEnd, HandStart, Table};
use crate::wallet::{EntryReason, WalletLedger};

/// Table actor handle for sending messages
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: String,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: String) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }
}

/// The one scheduled wakeup a table may have outstanding.
///
/// Exactly one deadline exists at a time: either the acting player's
/// countdown or the post-hand settlement pause. Arming a new one replaces
/// (cancels) the old one.
#[derive(Debug)]
enum Pending {
    /// Auto-fold `player_id` unless they act before `at`.
    Turn { player_id: PlayerId, at: Instant },
    /// Reset the table for the next hand at `at`.
    Settle { at: Instant },
}

impl Pending {
    fn at(&self) -> Instant {
        match self {
            Pending::Turn { at, .. } | Pending::Settle { at } => *at,
        }
    }
}

/// Table actor managing a single poker table.
///
/// All mutation flows through the inbox, so actions within one table are
/// strictly sequential; the timeout deadline lives in the same loop and can
/// therefore never race a real action.
pub struct TableActor {
    /// Table state machine
    table: Table,

    /// Table configuration
    config: TableConfig,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Wallet ledger for buy-ins, payouts, and cash-outs
    wallet: Arc<dyn WalletLedger>,

    /// Scheduled wakeup (turn timeout or settlement)
    pending: Option<Pending>,

    /// Subscribers for table events
    subscribers: HashMap<PlayerId, mpsc::Sender<TableEvent>>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor and its handle.
    pub fn new(
        table_id: &str,
        config: TableConfig,
        wallet: Arc<dyn WalletLedger>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let table = Table::new(table_id, config.name.clone(), config.rules());
        let actor = Self {
            table,
            config,
            inbox,
            wallet,
            pending: None,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        let handle = TableHandle::new(sender, table_id.to_string());
        (actor, handle)
    }

    /// Run the table actor event loop.
    pub async fn run(mut self) {
        log::info!(
            "table {} '{}' starting",
            self.table.id(),
            self.table.name()
        );

        loop {
            let deadline = self.pending.as_ref().map(Pending::at);
            tokio::select! {
                maybe_message = self.inbox.recv() => {
                    match maybe_message {
                        Some(message) => self.handle_message(message).await,
                        None => break,
                    }
                    if self.is_closed {
                        break;
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_deadline().await;
                }
            }
        }

        log::info!("table {} '{}' closed", self.table.id(), self.table.name());
    }

    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                player_id,
                buy_in,
                response,
            } => {
                let result = self.handle_join(&player_id, buy_in).await;
                let _ = response.send(result);
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.handle_leave(&player_id).await;
                let _ = response.send(result);
            }

            TableMessage::TakeAction {
                player_id,
                action,
                response,
            } => {
                let result = self.handle_action(&player_id, action).await;
                let _ = response.send(result);
            }

            TableMessage::ResolveShowdown {
                winner_id,
                response,
            } => {
                let result = self.handle_resolve_showdown(&winner_id).await;
                let _ = response.send(result);
            }

            TableMessage::GetState { response } => {
                let _ = response.send(self.state_response());
            }

            TableMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id.clone(), sender);
                log::debug!(
                    "{} subscribed to table {} events",
                    subscriber_id,
                    self.table.id()
                );
            }

            TableMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "{} unsubscribed from table {} events",
                    subscriber_id,
                    self.table.id()
                );
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(TableResponse::Ack);
            }
        }
    }

    /// Broadcast an event to all subscribers, dropping the disconnected.
    fn notify(&mut self, event: TableEvent) {
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("subscriber {subscriber_id} channel full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("subscriber {subscriber_id} disconnected, removing");
                    false
                }
            }
        });
    }

    /// Handle a join: wallet debit first, then the seat. A failed debit
    /// leaves the table untouched.
    async fn handle_join(&mut self, player_id: &str, buy_in: Chips) -> TableResponse {
        if let Err(e) = self.table.ensure_can_seat(player_id, buy_in) {
            return TableResponse::Rejected(e);
        }

        if let Err(e) = self
            .wallet
            .debit(player_id, buy_in, EntryReason::BuyIn)
            .await
        {
            log::info!(
                "table {}: buy-in of {} rejected for {}: {}",
                self.table.id(),
                buy_in,
                player_id,
                e
            );
            return TableResponse::WalletRejected(e.to_string());
        }

        let seat = match self.table.seat_player(player_id, buy_in) {
            Ok(seat) => seat,
            Err(e) => {
                // The pre-check passed, so this cannot happen in a
                // single-threaded actor; refund to keep the ledger honest.
                log::error!(
                    "table {}: seat lost between check and join for {player_id}: {e}",
                    self.table.id()
                );
                if let Err(refund_err) = self
                    .wallet
                    .credit(player_id, buy_in, EntryReason::CashOut)
                    .await
                {
                    log::error!(
                        "table {}: failed to refund {buy_in} to {player_id}: {refund_err}",
                        self.table.id()
                    );
                }
                return TableResponse::Rejected(e);
            }
        };

        log::info!(
            "table {}: {player_id} seated at {seat} with {buy_in} chips",
            self.table.id()
        );
        self.notify(TableEvent::PlayerJoined {
            player_id: player_id.to_string(),
            seat,
            stack: buy_in,
        });

        self.try_start_hand();
        TableResponse::Seated { seat, stack: buy_in }
    }

    async fn handle_leave(&mut self, player_id: &str) -> TableResponse {
        let outcome = match self.table.remove_player(player_id) {
            Ok(outcome) => outcome,
            Err(e) => return TableResponse::Rejected(e),
        };

        if outcome.cashed_out > 0
            && let Err(e) = self
                .wallet
                .credit(player_id, outcome.cashed_out, EntryReason::CashOut)
                .await
        {
            log::error!(
                "table {}: failed to cash out {} for {player_id}: {e}",
                self.table.id(),
                outcome.cashed_out
            );
        }

        log::info!(
            "table {}: {player_id} left with {} chips",
            self.table.id(),
            outcome.cashed_out
        );
        self.notify(TableEvent::PlayerLeft {
            player_id: player_id.to_string(),
            cashed_out: outcome.cashed_out,
        });

        if let Some(hand) = outcome.hand {
            self.after_outcome(hand).await;
        }
        TableResponse::Ack
    }

    async fn handle_action(&mut self, player_id: &str, action: Action) -> TableResponse {
        match self.table.apply_action(player_id, action) {
            Ok(outcome) => {
                log::debug!("table {}: {player_id} {action}", self.table.id());
                self.after_outcome(outcome).await;
                TableResponse::Ack
            }
            Err(GameError::DeckExhausted) => {
                // Engine bug: a bounded hand cannot exhaust the deck.
                log::error!(
                    "table {}: deck exhausted mid-hand, closing table",
                    self.table.id()
                );
                self.is_closed = true;
                TableResponse::Rejected(GameError::DeckExhausted)
            }
            Err(e) => TableResponse::Rejected(e),
        }
    }

    async fn handle_resolve_showdown(&mut self, winner_id: &str) -> TableResponse {
        match self.table.resolve_showdown(winner_id) {
            Ok(ended) => {
                self.finish_hand(ended).await;
                TableResponse::Ack
            }
            Err(e) => TableResponse::Rejected(e),
        }
    }

    /// Act on what the engine said happened: advance the turn, enter the
    /// showdown, or settle the hand. Exactly one deadline survives this.
    async fn after_outcome(&mut self, outcome: ActionOutcome) {
        if let Some(ended) = outcome.ended {
            self.finish_hand(ended).await;
            return;
        }
        if let Some(cards) = outcome.community {
            self.pending = None;
            self.notify(TableEvent::CommunityCardsDealt { cards });
            return;
        }
        if let Some(next) = outcome.next {
            self.require_action(next);
        }
    }

    /// Start the acting player's countdown and tell subscribers whose turn
    /// it is. Replaces any previously armed deadline.
    fn require_action(&mut self, player_id: PlayerId) {
        let to_call = self.table.call_amount(&player_id).unwrap_or(0);
        self.pending = Some(Pending::Turn {
            player_id: player_id.clone(),
            at: Instant::now() + self.config.action_timeout,
        });
        self.notify(TableEvent::ActionRequired {
            player_id,
            to_call,
            pot: self.table.pot(),
            current_bet: self.table.current_bet(),
        });
    }

    /// Pay the winner through the wallet and schedule the table reset.
    async fn finish_hand(&mut self, ended: HandEnd) {
        match &ended.winner {
            Some(winner) if ended.pot > 0 => {
                match self
                    .wallet
                    .credit(winner, ended.pot, EntryReason::Payout)
                    .await
                {
                    Ok(balance) => log::info!(
                        "table {}: {winner} wins pot of {} ({:?}), balance now {balance}",
                        self.table.id(),
                        ended.pot,
                        ended.reason
                    ),
                    Err(e) => log::error!(
                        "table {}: failed to pay pot of {} to {winner}: {e}",
                        self.table.id(),
                        ended.pot
                    ),
                }
            }
            Some(winner) => {
                log::info!("table {}: {winner} wins an empty pot", self.table.id());
            }
            None => {
                log::warn!(
                    "table {}: hand ended with no contesting players, pot of {} unclaimed",
                    self.table.id(),
                    ended.pot
                );
            }
        }

        self.notify(TableEvent::GameFinished {
            winner: ended.winner,
            pot: ended.pot,
            reason: ended.reason,
        });
        self.pending = Some(Pending::Settle {
            at: Instant::now() + self.config.settle_delay,
        });
    }

    /// A scheduled wakeup fired: either a turn timed out or the settlement
    /// pause elapsed.
    async fn handle_deadline(&mut self) {
        match self.pending.take() {
            Some(Pending::Turn { player_id, .. }) => {
                // The timer is only honored if the player is still acting;
                // a real action that landed first has already re-armed or
                // cleared the deadline.
                if self.table.to_act_player() == Some(&player_id) {
                    log::info!(
                        "table {}: {player_id} timed out, folding",
                        self.table.id()
                    );
                    match self.table.apply_action(&player_id, Action::Fold) {
                        Ok(outcome) => self.after_outcome(outcome).await,
                        Err(e) => log::error!(
                            "table {}: auto-fold for {player_id} failed: {e}",
                            self.table.id()
                        ),
                    }
                }
            }
            Some(Pending::Settle { .. }) => self.settle().await,
            None => {}
        }
    }

    /// Reset after the settlement pause: boot broke players, announce
    /// readiness, and deal the next hand if the table still has players.
    async fn settle(&mut self) {
        let reset = match self.table.reset_for_next_hand() {
            Ok(reset) => reset,
            Err(e) => {
                log::error!("table {}: settle failed: {e}", self.table.id());
                return;
            }
        };

        for (player_id, residual) in reset.booted {
            if residual > 0
                && let Err(e) = self
                    .wallet
                    .credit(&player_id, residual, EntryReason::CashOut)
                    .await
            {
                log::error!(
                    "table {}: failed to cash out booted player {player_id}: {e}",
                    self.table.id()
                );
            }
            log::info!(
                "table {}: {player_id} booted, stack below the big blind",
                self.table.id()
            );
            self.notify(TableEvent::PlayerLeft {
                player_id,
                cashed_out: residual,
            });
        }

        self.notify(TableEvent::ReadyForNextHand {
            player_count: self.table.player_count(),
        });
        self.try_start_hand();
    }

    /// Start a hand if the table is waiting with enough players.
    fn try_start_hand(&mut self) {
        match self.table.start_hand() {
            Ok(start) => self.announce_hand(start),
            Err(GameError::NotEnoughPlayers) | Err(GameError::HandInProgress) => {}
            Err(e) => log::error!(
                "table {}: failed to start hand: {e}",
                self.table.id()
            ),
        }
    }

    fn announce_hand(&mut self, start: HandStart) {
        log::info!(
            "table {}: hand {} started, button at {}",
            self.table.id(),
            start.hand_no,
            start.button
        );
        self.notify(TableEvent::GameStarted {
            hand_no: start.hand_no,
            button: start.button,
            small_blind: BlindPost {
                player_id: start.small_blind.0,
                amount: start.small_blind.1,
            },
            big_blind: BlindPost {
                player_id: start.big_blind.0,
                amount: start.big_blind.1,
            },
        });
        self.require_action(start.to_act);
    }

    fn state_response(&self) -> TableStateResponse {
        let snapshot = self.table.snapshot();
        TableStateResponse {
            table_id: self.table.id().to_string(),
            table_name: self.table.name().to_string(),
            status: snapshot.status,
            player_count: snapshot.player_count,
            max_players: self.config.max_players,
            players: self.table.players().map(|p| p.id.clone()).collect(),
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            pot: snapshot.pot,
            current_bet: snapshot.current_bet,
            community_cards: snapshot.community,
            button: snapshot.button,
            to_act: snapshot.to_act,
            hand_no: snapshot.hand_no,
        }
    }
}
