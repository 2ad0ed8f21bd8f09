//! The per-table betting-round state machine.
//!
//! [`Table`] is the pure core of the engine: it owns the seats, deck, pot,
//! and turn order for a single table and enforces every betting invariant
//! synchronously. All mutating operations either fully apply or reject
//! without touching state. The async actor in [`crate::table`] is responsible
//! for serializing calls, running timeouts, and talking to the wallet.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::constants::{
    COMMUNITY_CARDS, DEFAULT_BIG_BLIND, DEFAULT_MAX_BUY_IN_BB, DEFAULT_MIN_BUY_IN_BB,
    DEFAULT_SMALL_BLIND, MAX_PLAYERS,
};
use super::entities::{Action, Blinds, Card, Chips, Deck, Player, PlayerId, SeatIndex};
use super::errors::{GameError, GameResult};

/// Table lifecycle status.
///
/// `Waiting -> Betting -> Showdown -> Finished -> Waiting` is the full cycle;
/// a fold-out skips `Showdown` and goes straight to `Finished`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Waiting,
    Betting,
    Showdown,
    Finished,
}

/// Stakes and seating bounds for a table, in chips.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableRules {
    pub max_players: usize,
    pub blinds: Blinds,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            blinds: Blinds {
                small: DEFAULT_SMALL_BLIND,
                big: DEFAULT_BIG_BLIND,
            },
            min_buy_in: DEFAULT_BIG_BLIND * DEFAULT_MIN_BUY_IN_BB as Chips,
            max_buy_in: DEFAULT_BIG_BLIND * DEFAULT_MAX_BUY_IN_BB as Chips,
        }
    }
}

/// Everything the caller needs to announce a freshly started hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandStart {
    pub hand_no: u64,
    pub button: SeatIndex,
    pub small_blind: (PlayerId, Chips),
    pub big_blind: (PlayerId, Chips),
    pub to_act: PlayerId,
}

/// Why a hand ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    FoldOut,
    Showdown,
    PlayersLeft,
}

/// Terminal result of a hand. `winner` is `None` only when every contesting
/// player left mid-hand, in which case the pot is unclaimable.
#[derive(Clone, Debug, PartialEq)]
pub struct HandEnd {
    pub winner: Option<PlayerId>,
    pub pot: Chips,
    pub reason: EndReason,
}

/// What happened to the hand as a result of one applied action.
///
/// At most one of `next`, `community`, and `ended` is set: the turn moved on,
/// the betting round completed into a showdown, or the hand terminated.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub pot: Chips,
    pub current_bet: Chips,
    pub next: Option<PlayerId>,
    pub community: Option<Vec<Card>>,
    pub ended: Option<HandEnd>,
}

/// Result of unseating a player.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoveOutcome {
    /// Remaining stack to return to the player's wallet.
    pub cashed_out: Chips,
    /// Set when the removal changed the course of a live hand.
    pub hand: Option<ActionOutcome>,
}

/// Result of resetting a finished hand.
#[derive(Clone, Debug, PartialEq)]
pub struct ResetOutcome {
    /// Players removed because their stack no longer covers the big blind,
    /// with the residual stack to cash out.
    pub booted: Vec<(PlayerId, Chips)>,
    /// True when enough players remain to start the next hand.
    pub ready: bool,
}

/// Point-in-time public view of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableState {
    pub status: TableStatus,
    pub player_count: usize,
    pub pot: Chips,
    pub current_bet: Chips,
    pub community: Vec<Card>,
    pub button: SeatIndex,
    pub to_act: Option<PlayerId>,
    pub hand_no: u64,
}

/// A single poker table: seats, deck, pot, and turn order.
#[derive(Clone, Debug)]
pub struct Table {
    id: String,
    name: String,
    rules: TableRules,
    status: TableStatus,
    seats: Vec<Option<Player>>,
    deck: Deck,
    community: Vec<Card>,
    pot: Chips,
    current_bet: Chips,
    to_act: Option<SeatIndex>,
    button: SeatIndex,
    hand_no: u64,
}

impl Table {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, rules: TableRules) -> Self {
        let max_players = rules.max_players.min(MAX_PLAYERS);
        Self {
            id: id.into(),
            name: name.into(),
            rules,
            status: TableStatus::Waiting,
            seats: vec![None; max_players],
            deck: Deck::fresh_shuffled(),
            community: Vec::with_capacity(COMMUNITY_CARDS),
            pot: 0,
            current_bet: 0,
            to_act: None,
            button: 0,
            hand_no: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn hand_no(&self) -> u64 {
        self.hand_no
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    pub fn player_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter().flatten()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players().find(|p| p.id == id)
    }

    pub fn seat_of(&self, id: &str) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|p| p.id == id))
    }

    /// Identity of the player whose turn it is, if any.
    pub fn to_act_player(&self) -> Option<&PlayerId> {
        self.to_act
            .and_then(|seat| self.seats[seat].as_ref())
            .map(|p| &p.id)
    }

    /// Chips the given player must still put in to match the current bet.
    pub fn call_amount(&self, id: &str) -> GameResult<Chips> {
        let player = self.player(id).ok_or(GameError::UnknownPlayer)?;
        Ok(self.current_bet.saturating_sub(player.bet))
    }

    #[must_use]
    pub fn snapshot(&self) -> TableState {
        TableState {
            status: self.status,
            player_count: self.player_count(),
            pot: self.pot,
            current_bet: self.current_bet,
            community: self.community.clone(),
            button: self.button,
            to_act: self.to_act_player().cloned(),
            hand_no: self.hand_no,
        }
    }

    /// Validate a join without mutating: free seat, not already seated,
    /// buy-in within bounds. Returns the seat a join would take.
    pub fn ensure_can_seat(&self, id: &str, buy_in: Chips) -> GameResult<SeatIndex> {
        if self.seat_of(id).is_some() {
            return Err(GameError::AlreadySeated);
        }
        if buy_in < self.rules.min_buy_in || buy_in > self.rules.max_buy_in {
            return Err(GameError::InvalidBuyIn {
                min: self.rules.min_buy_in,
                max: self.rules.max_buy_in,
            });
        }
        self.seats
            .iter()
            .position(Option::is_none)
            .ok_or(GameError::TableFull)
    }

    /// Seat a player with the given buy-in as their starting stack.
    ///
    /// Players seated while a hand is live are dealt in from the next hand.
    pub fn seat_player(&mut self, id: &str, buy_in: Chips) -> GameResult<SeatIndex> {
        let seat = self.ensure_can_seat(id, buy_in)?;
        self.seats[seat] = Some(Player::new(id, buy_in));
        Ok(seat)
    }

    /// Start a new hand: fresh shuffled deck, two hole cards per eligible
    /// player, blinds posted, first turn assigned.
    ///
    /// Heads-up, the button posts the small blind; otherwise the blinds are
    /// the two seats after the button. The seat after the big blind acts
    /// first and the big blind seeds `current_bet`.
    pub fn start_hand(&mut self) -> GameResult<HandStart> {
        if self.status != TableStatus::Waiting {
            return Err(GameError::HandInProgress);
        }
        let eligible: Vec<SeatIndex> = self
            .seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
            .filter(|(_, p)| p.stack >= self.rules.blinds.big)
            .map(|(i, _)| i)
            .collect();
        if eligible.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }

        self.hand_no += 1;
        self.deck = Deck::fresh_shuffled();
        self.community.clear();
        self.pot = 0;
        self.current_bet = 0;

        for (i, seat) in self.seats.iter_mut().enumerate() {
            if let Some(player) = seat {
                player.bet = 0;
                player.folded = false;
                player.last_action = None;
                player.in_hand = eligible.contains(&i);
                player.hole_cards = if player.in_hand {
                    Some([self.deck.deal()?, self.deck.deal()?])
                } else {
                    None
                };
            }
        }

        // Keep the button on an in-hand seat.
        self.button = self
            .next_in_hand_from(self.button)
            .ok_or(GameError::NotEnoughPlayers)?;
        let (sb_seat, bb_seat) = if eligible.len() == 2 {
            let other = self
                .next_in_hand_after(self.button)
                .ok_or(GameError::NotEnoughPlayers)?;
            (self.button, other)
        } else {
            let sb = self
                .next_in_hand_after(self.button)
                .ok_or(GameError::NotEnoughPlayers)?;
            let bb = self
                .next_in_hand_after(sb)
                .ok_or(GameError::NotEnoughPlayers)?;
            (sb, bb)
        };

        let small = self.post_blind(sb_seat, self.rules.blinds.small);
        let big = self.post_blind(bb_seat, self.rules.blinds.big);
        self.current_bet = self.rules.blinds.big;

        let first = self
            .next_actionable_after(bb_seat)
            .ok_or(GameError::NotEnoughPlayers)?;
        self.to_act = Some(first);
        self.status = TableStatus::Betting;

        Ok(HandStart {
            hand_no: self.hand_no,
            button: self.button,
            small_blind: small,
            big_blind: big,
            to_act: self.player_id_at(first),
        })
    }

    /// Apply a betting action for `id`.
    ///
    /// Any illegal action (out of turn, after folding, violating stack or bet
    /// constraints) is rejected with the table left completely unchanged.
    pub fn apply_action(&mut self, id: &str, action: Action) -> GameResult<ActionOutcome> {
        if self.status != TableStatus::Betting {
            return Err(GameError::NoBettingRound);
        }
        let seat = self.seat_of(id).ok_or(GameError::UnknownPlayer)?;
        let (delta, new_current_bet) = {
            let player = self.seats[seat].as_ref().ok_or(GameError::UnknownPlayer)?;
            if player.folded {
                return Err(GameError::AlreadyFolded);
            }
            if !player.in_hand || self.to_act != Some(seat) {
                return Err(GameError::OutOfTurn);
            }
            match action {
                Action::Check => {
                    if player.bet != self.current_bet {
                        return Err(GameError::CheckNotAllowed {
                            to_call: self.current_bet - player.bet,
                        });
                    }
                    (0, self.current_bet)
                }
                Action::Call => {
                    let owed = self.current_bet - player.bet;
                    (owed.min(player.stack), self.current_bet)
                }
                Action::Raise(amount) => {
                    if amount > player.stack {
                        return Err(GameError::InsufficientStack {
                            amount,
                            stack: player.stack,
                        });
                    }
                    let total = player.bet + amount;
                    if total <= self.current_bet {
                        return Err(GameError::RaiseTooSmall {
                            total,
                            current_bet: self.current_bet,
                        });
                    }
                    (amount, total)
                }
                Action::Fold => (0, self.current_bet),
            }
        };

        // Validation is done; everything below must succeed.
        let player = self.seats[seat].as_mut().ok_or(GameError::UnknownPlayer)?;
        player.stack -= delta;
        player.bet += delta;
        if action == Action::Fold {
            player.folded = true;
        }
        player.last_action = Some((action, Utc::now()));
        self.pot += delta;
        self.current_bet = new_current_bet;

        self.resolve_after(seat, EndReason::FoldOut)
    }

    /// Resolve a showdown with an externally supplied winner.
    ///
    /// Hand ranking is deliberately not implemented here; the single betting
    /// round ends either by fold-out or by this call.
    pub fn resolve_showdown(&mut self, winner_id: &str) -> GameResult<HandEnd> {
        if self.status != TableStatus::Showdown {
            return Err(GameError::NoShowdown);
        }
        let seat = self.seat_of(winner_id).ok_or(GameError::UnknownPlayer)?;
        let eligible = self.seats[seat]
            .as_ref()
            .is_some_and(Player::is_contesting);
        if !eligible {
            return Err(GameError::IneligibleWinner);
        }
        Ok(self.finish(Some(self.player_id_at(seat)), EndReason::Showdown))
    }

    /// Unseat a player, returning their remaining stack for cash-out.
    ///
    /// Leaving mid-hand forfeits the player's contributions to the pot
    /// (equivalent to a fold). If fewer than two contesting players remain,
    /// the hand is forced to finish with no further betting.
    pub fn remove_player(&mut self, id: &str) -> GameResult<RemoveOutcome> {
        let seat = self.seat_of(id).ok_or(GameError::UnknownPlayer)?;
        let player = self.seats[seat].take().ok_or(GameError::UnknownPlayer)?;
        let cashed_out = player.stack;
        let live = matches!(self.status, TableStatus::Betting | TableStatus::Showdown);
        if !live || !player.is_contesting() {
            return Ok(RemoveOutcome {
                cashed_out,
                hand: None,
            });
        }

        let contesting = self.contesting_seats();
        let hand = if contesting.len() <= 1 {
            let winner = contesting.first().map(|&s| self.player_id_at(s));
            let ended = self.finish(winner, EndReason::PlayersLeft);
            Some(self.outcome(None, None, Some(ended)))
        } else if self.status == TableStatus::Betting {
            if self.round_complete() {
                let cards = self.enter_showdown()?;
                Some(self.outcome(None, Some(cards), None))
            } else if self.to_act == Some(seat) {
                let next = self
                    .next_actionable_after(seat)
                    .ok_or(GameError::NoBettingRound)?;
                self.to_act = Some(next);
                let next_id = self.player_id_at(next);
                Some(self.outcome(Some(next_id), None, None))
            } else {
                None
            }
        } else {
            // Showdown continues between the remaining contenders.
            None
        };

        Ok(RemoveOutcome { cashed_out, hand })
    }

    /// Reset a finished hand: clear the pot, bets, and cards, boot players
    /// who can no longer cover the big blind, and rotate the button.
    pub fn reset_for_next_hand(&mut self) -> GameResult<ResetOutcome> {
        if self.status != TableStatus::Finished {
            return Err(GameError::NoFinishedHand);
        }
        self.pot = 0;
        self.current_bet = 0;
        self.community.clear();
        self.to_act = None;
        for seat in self.seats.iter_mut().flatten() {
            seat.bet = 0;
            seat.folded = false;
            seat.in_hand = false;
            seat.hole_cards = None;
            seat.last_action = None;
        }

        let mut booted = Vec::new();
        for slot in &mut self.seats {
            if slot
                .as_ref()
                .is_some_and(|p| p.stack < self.rules.blinds.big)
                && let Some(player) = slot.take()
            {
                booted.push((player.id, player.stack));
            }
        }

        if let Some(next_button) = self.next_occupied_after(self.button) {
            self.button = next_button;
        }
        self.status = TableStatus::Waiting;
        Ok(ResetOutcome {
            ready: self.player_count() >= 2,
            booted,
        })
    }

    fn player_id_at(&self, seat: SeatIndex) -> PlayerId {
        self.seats[seat]
            .as_ref()
            .map(|p| p.id.clone())
            .unwrap_or_default()
    }

    fn contesting_seats(&self) -> Vec<SeatIndex> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().is_some_and(Player::is_contesting))
            .map(|(i, _)| i)
            .collect()
    }

    /// The betting round is complete once every contesting player has
    /// matched the current bet or is all-in.
    fn round_complete(&self) -> bool {
        self.seats
            .iter()
            .flatten()
            .filter(|p| p.is_contesting())
            .all(|p| p.bet == self.current_bet || p.stack == 0)
    }

    fn next_seat_where(
        &self,
        from: SeatIndex,
        include_from: bool,
        pred: impl Fn(&Player) -> bool,
    ) -> Option<SeatIndex> {
        let len = self.seats.len();
        let offsets = if include_from { 0..len } else { 1..len + 1 };
        for offset in offsets {
            let seat = (from + offset) % len;
            if self.seats[seat].as_ref().is_some_and(&pred) {
                return Some(seat);
            }
        }
        None
    }

    fn next_occupied_after(&self, from: SeatIndex) -> Option<SeatIndex> {
        self.next_seat_where(from, false, |_| true)
    }

    fn next_in_hand_from(&self, from: SeatIndex) -> Option<SeatIndex> {
        self.next_seat_where(from, true, |p| p.in_hand)
    }

    fn next_in_hand_after(&self, from: SeatIndex) -> Option<SeatIndex> {
        self.next_seat_where(from, false, |p| p.in_hand)
    }

    /// Next seat that can still act: contesting and not all-in.
    fn next_actionable_after(&self, from: SeatIndex) -> Option<SeatIndex> {
        self.next_seat_where(from, false, |p| p.is_contesting() && p.stack > 0)
    }

    fn post_blind(&mut self, seat: SeatIndex, amount: Chips) -> (PlayerId, Chips) {
        let (id, delta) = match self.seats[seat].as_mut() {
            Some(player) => {
                let delta = amount.min(player.stack);
                player.stack -= delta;
                player.bet += delta;
                (player.id.clone(), delta)
            }
            None => (PlayerId::default(), 0),
        };
        self.pot += delta;
        (id, delta)
    }

    fn enter_showdown(&mut self) -> GameResult<Vec<Card>> {
        while self.community.len() < COMMUNITY_CARDS {
            let card = self.deck.deal()?;
            self.community.push(card);
        }
        self.status = TableStatus::Showdown;
        self.to_act = None;
        Ok(self.community.clone())
    }

    fn finish(&mut self, winner: Option<PlayerId>, reason: EndReason) -> HandEnd {
        self.status = TableStatus::Finished;
        self.to_act = None;
        HandEnd {
            winner,
            pot: self.pot,
            reason,
        }
    }

    fn resolve_after(&mut self, acted: SeatIndex, reason: EndReason) -> GameResult<ActionOutcome> {
        let contesting = self.contesting_seats();
        if contesting.len() <= 1 {
            let winner = contesting.first().map(|&s| self.player_id_at(s));
            let ended = self.finish(winner, reason);
            return Ok(self.outcome(None, None, Some(ended)));
        }
        if self.round_complete() {
            let cards = self.enter_showdown()?;
            return Ok(self.outcome(None, Some(cards), None));
        }
        let next = self
            .next_actionable_after(acted)
            .ok_or(GameError::NoBettingRound)?;
        self.to_act = Some(next);
        let next_id = self.player_id_at(next);
        Ok(self.outcome(Some(next_id), None, None))
    }

    fn outcome(
        &self,
        next: Option<PlayerId>,
        community: Option<Vec<Card>>,
        ended: Option<HandEnd>,
    ) -> ActionOutcome {
        ActionOutcome {
            pot: self.pot,
            current_bet: self.current_bet,
            next,
            community,
            ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn micro_rules() -> TableRules {
        TableRules {
            max_players: 6,
            blinds: Blinds { small: 1, big: 2 },
            min_buy_in: 40,
            max_buy_in: 200,
        }
    }

    fn table_with(players: &[(&str, Chips)]) -> Table {
        let mut table = Table::new("t1", "Test Table", micro_rules());
        for (id, buy_in) in players {
            table.seat_player(id, *buy_in).unwrap();
        }
        table
    }

    fn full_state(table: &Table) -> (TableState, Vec<Player>) {
        (table.snapshot(), table.players().cloned().collect())
    }

    #[test]
    fn seating_enforces_buy_in_bounds_and_capacity() {
        let mut table = Table::new("t1", "Test Table", micro_rules());
        assert_eq!(
            table.seat_player("a", 39),
            Err(GameError::InvalidBuyIn { min: 40, max: 200 })
        );
        assert_eq!(
            table.seat_player("a", 201),
            Err(GameError::InvalidBuyIn { min: 40, max: 200 })
        );
        table.seat_player("a", 100).unwrap();
        assert_eq!(table.seat_player("a", 100), Err(GameError::AlreadySeated));
        for i in 0..5 {
            table.seat_player(&format!("p{i}"), 100).unwrap();
        }
        assert_eq!(table.seat_player("late", 100), Err(GameError::TableFull));
    }

    #[test]
    fn heads_up_blind_scenario() {
        // Table with blinds (1,2); A is button and posts the small blind.
        let mut table = table_with(&[("a", 100), ("b", 100)]);
        let start = table.start_hand().unwrap();
        assert_eq!(start.small_blind, ("a".to_string(), 1));
        assert_eq!(start.big_blind, ("b".to_string(), 2));
        assert_eq!(start.to_act, "a");
        assert_eq!(table.pot(), 3);
        assert_eq!(table.current_bet(), 2);

        // A calls the remaining 1: pot is 4, both bets equal, round complete.
        let outcome = table.apply_action("a", Action::Call).unwrap();
        assert_eq!(outcome.pot, 4);
        assert_eq!(table.player("a").unwrap().bet, 2);
        assert_eq!(table.player("b").unwrap().bet, 2);
        assert!(outcome.community.is_some());
        assert_eq!(table.status(), TableStatus::Showdown);
    }

    #[test]
    fn dealt_cards_are_unique_within_a_hand() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        // a and b call the big blind; every bet now matches, so the round
        // completes and the community cards come out.
        table.apply_action("a", Action::Call).unwrap();
        let outcome = table.apply_action("b", Action::Call).unwrap();
        assert!(outcome.community.is_some());

        let mut seen = BTreeSet::new();
        for player in table.players() {
            for card in player.hole_cards.unwrap() {
                assert!(seen.insert(card), "duplicate hole card {card}");
            }
        }
        for card in table.community() {
            assert!(seen.insert(*card), "duplicate community card {card}");
        }
        assert_eq!(seen.len(), 3 * 2 + 5);
    }

    #[test]
    fn out_of_turn_action_rejected_without_side_effects() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        // a=button, b=SB, c=BB, so a acts first; b acting is out of turn.
        let before = full_state(&table);
        assert_eq!(
            table.apply_action("b", Action::Call),
            Err(GameError::OutOfTurn)
        );
        assert_eq!(
            table.apply_action("b", Action::Raise(10)),
            Err(GameError::OutOfTurn)
        );
        assert_eq!(full_state(&table), before);
    }

    #[test]
    fn folded_player_cannot_act_again() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Fold).unwrap();
        let before = full_state(&table);
        assert_eq!(
            table.apply_action("a", Action::Call),
            Err(GameError::AlreadyFolded)
        );
        assert_eq!(full_state(&table), before);
    }

    #[test]
    fn raise_validates_stack_and_moves_the_high_water_mark() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        let before = full_state(&table);
        assert_eq!(
            table.apply_action("a", Action::Raise(101)),
            Err(GameError::InsufficientStack {
                amount: 101,
                stack: 100
            })
        );
        // A raise whose total does not exceed the current bet is no raise.
        assert_eq!(
            table.apply_action("a", Action::Raise(2)),
            Err(GameError::RaiseTooSmall {
                total: 2,
                current_bet: 2
            })
        );
        assert_eq!(full_state(&table), before);

        let outcome = table.apply_action("a", Action::Raise(10)).unwrap();
        assert_eq!(table.current_bet(), 10);
        assert_eq!(outcome.pot, 3 + 10);
        assert_eq!(table.player("a").unwrap().stack, 90);
    }

    #[test]
    fn current_bet_never_decreases_within_a_round() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Raise(10)).unwrap();
        assert_eq!(
            table.apply_action("b", Action::Raise(5)),
            Err(GameError::RaiseTooSmall {
                total: 6,
                current_bet: 10
            })
        );
        table.apply_action("b", Action::Raise(20)).unwrap();
        assert_eq!(table.current_bet(), 21);
    }

    #[test]
    fn check_requires_a_matched_bet() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        assert_eq!(
            table.apply_action("a", Action::Check),
            Err(GameError::CheckNotAllowed { to_call: 2 })
        );
    }

    #[test]
    fn fold_out_ends_the_hand_immediately() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Fold).unwrap();
        let outcome = table.apply_action("b", Action::Fold).unwrap();
        let ended = outcome.ended.unwrap();
        assert_eq!(ended.winner.as_deref(), Some("c"));
        assert_eq!(ended.pot, 3);
        assert_eq!(ended.reason, EndReason::FoldOut);
        assert_eq!(table.status(), TableStatus::Finished);
        // No further actions are accepted.
        assert_eq!(
            table.apply_action("c", Action::Check),
            Err(GameError::NoBettingRound)
        );
    }

    #[test]
    fn all_in_call_is_capped_by_stack() {
        let mut table = table_with(&[("a", 100), ("b", 50)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Raise(99)).unwrap();
        // b has 48 behind after the blind; the call puts them all-in short.
        let outcome = table.apply_action("b", Action::Call).unwrap();
        let b = table.player("b").unwrap();
        assert_eq!(b.stack, 0);
        assert_eq!(b.bet, 50);
        assert!(b.is_all_in());
        assert_eq!(outcome.pot, 150);
        // Round completes even though b's bet is short of current_bet.
        assert!(outcome.community.is_some());
        assert_eq!(table.status(), TableStatus::Showdown);
    }

    #[test]
    fn showdown_requires_external_winner() {
        let mut table = table_with(&[("a", 100), ("b", 100)]);
        table.start_hand().unwrap();
        assert_eq!(table.resolve_showdown("a"), Err(GameError::NoShowdown));
        table.apply_action("a", Action::Call).unwrap();
        assert_eq!(table.status(), TableStatus::Showdown);
        assert_eq!(
            table.resolve_showdown("nobody"),
            Err(GameError::UnknownPlayer)
        );
        let ended = table.resolve_showdown("b").unwrap();
        assert_eq!(ended.winner.as_deref(), Some("b"));
        assert_eq!(ended.pot, 4);
        assert_eq!(ended.reason, EndReason::Showdown);
    }

    #[test]
    fn leaving_mid_hand_forfeits_and_forces_finish() {
        let mut table = table_with(&[("a", 100), ("b", 100)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Raise(9)).unwrap();
        // a has 10 in the pot plus b's blind; a leaves, b wins by default.
        let removed = table.remove_player("a").unwrap();
        assert_eq!(removed.cashed_out, 90);
        let ended = removed.hand.unwrap().ended.unwrap();
        assert_eq!(ended.winner.as_deref(), Some("b"));
        assert_eq!(ended.pot, 12);
        assert_eq!(ended.reason, EndReason::PlayersLeft);
        assert_eq!(table.status(), TableStatus::Finished);
    }

    #[test]
    fn leaving_out_of_hand_does_not_disturb_play() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        table.seat_player("d", 100).unwrap();
        let removed = table.remove_player("d").unwrap();
        assert_eq!(removed.cashed_out, 100);
        assert!(removed.hand.is_none());
        assert_eq!(table.status(), TableStatus::Betting);
    }

    #[test]
    fn turn_passes_over_a_leaving_actor() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        assert_eq!(table.to_act_player().map(String::as_str), Some("a"));
        let removed = table.remove_player("a").unwrap();
        let hand = removed.hand.unwrap();
        assert_eq!(hand.next.as_deref(), Some("b"));
        assert_eq!(table.to_act_player().map(String::as_str), Some("b"));
    }

    #[test]
    fn reset_rotates_button_and_boots_short_stacks() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        table.apply_action("a", Action::Fold).unwrap();
        table.apply_action("b", Action::Fold).unwrap();
        assert_eq!(table.status(), TableStatus::Finished);

        // Drain c's stack below the big blind before settling.
        if let Some(seat) = table.seat_of("c") {
            if let Some(player) = table.seats[seat].as_mut() {
                player.stack = 1;
            }
        }
        let reset = table.reset_for_next_hand().unwrap();
        assert_eq!(reset.booted, vec![("c".to_string(), 1)]);
        assert!(reset.ready);
        assert_eq!(table.status(), TableStatus::Waiting);
        assert_eq!(table.snapshot().button, table.seat_of("b").unwrap());
        assert_eq!(table.pot(), 0);
        assert_eq!(table.current_bet(), 0);
        assert!(table.community().is_empty());
        for player in table.players() {
            assert_eq!(player.bet, 0);
            assert!(player.hole_cards.is_none());
            assert!(!player.folded);
        }
    }

    #[test]
    fn mid_hand_joiner_is_dealt_in_next_hand() {
        let mut table = table_with(&[("a", 100), ("b", 100)]);
        table.start_hand().unwrap();
        table.seat_player("c", 100).unwrap();
        assert!(!table.player("c").unwrap().in_hand);
        assert_eq!(
            table.apply_action("c", Action::Call),
            Err(GameError::OutOfTurn)
        );
        table.apply_action("a", Action::Fold).unwrap();
        table.reset_for_next_hand().unwrap();
        table.start_hand().unwrap();
        assert!(table.player("c").unwrap().in_hand);
        assert!(table.player("c").unwrap().hole_cards.is_some());
    }

    #[test]
    fn pot_matches_sum_of_bets_through_a_hand() {
        let mut table = table_with(&[("a", 100), ("b", 100), ("c", 100)]);
        table.start_hand().unwrap();
        let assert_conserved = |table: &Table| {
            let bets: Chips = table.players().map(|p| p.bet).sum();
            assert_eq!(table.pot(), bets);
        };
        assert_conserved(&table);
        table.apply_action("a", Action::Raise(10)).unwrap();
        assert_conserved(&table);
        table.apply_action("b", Action::Call).unwrap();
        assert_conserved(&table);
        table.apply_action("c", Action::Fold).unwrap();
        assert_conserved(&table);
    }
}
