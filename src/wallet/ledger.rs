//! The wallet ledger trait and its in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{WalletError, WalletResult};
use super::models::{EntryDirection, EntryReason, WalletEntry};
use crate::game::entities::{Chips, PlayerId};

/// The wallet collaborator as seen by the engine.
///
/// Both operations are called synchronously relative to the table transition
/// they belong to: a failed `debit` means no seat is taken and no table state
/// changes; a `credit` happens in the same settlement step that decided the
/// payout, so stack accounting and wallet accounting never diverge.
#[async_trait]
pub trait WalletLedger: Send + Sync {
    /// Remove `amount` from the player's spendable balance. Returns the new
    /// balance.
    async fn debit(&self, player_id: &str, amount: Chips, reason: EntryReason)
    -> WalletResult<Chips>;

    /// Add `amount` to the player's spendable balance. Returns the new
    /// balance.
    async fn credit(
        &self,
        player_id: &str,
        amount: Chips,
        reason: EntryReason,
    ) -> WalletResult<Chips>;
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<PlayerId, Chips>,
    entries: Vec<WalletEntry>,
}

/// In-process wallet: per-player balances plus an append-only entry log.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or top up) an account with an opening balance.
    pub async fn open_account(&self, player_id: &str, opening_balance: Chips) {
        let mut inner = self.inner.write().await;
        *inner.balances.entry(player_id.to_string()).or_insert(0) += opening_balance;
    }

    /// Current spendable balance, if the account exists.
    pub async fn balance(&self, player_id: &str) -> Option<Chips> {
        self.inner.read().await.balances.get(player_id).copied()
    }

    /// Snapshot of every recorded entry, oldest first.
    pub async fn entries(&self) -> Vec<WalletEntry> {
        self.inner.read().await.entries.clone()
    }

    /// Sum of all balances. Useful for conservation checks in tests.
    pub async fn total_balance(&self) -> Chips {
        self.inner.read().await.balances.values().sum()
    }
}

impl LedgerInner {
    fn record(
        &mut self,
        player_id: &str,
        amount: Chips,
        direction: EntryDirection,
        reason: EntryReason,
        balance_after: Chips,
    ) {
        self.entries.push(WalletEntry {
            id: Uuid::new_v4(),
            player_id: player_id.to_string(),
            amount,
            balance_after,
            direction,
            reason,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl WalletLedger for InMemoryLedger {
    async fn debit(
        &self,
        player_id: &str,
        amount: Chips,
        reason: EntryReason,
    ) -> WalletResult<Chips> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let mut inner = self.inner.write().await;
        let balance = inner
            .balances
            .get_mut(player_id)
            .ok_or_else(|| WalletError::UnknownAccount(player_id.to_string()))?;
        if *balance < amount {
            return Err(WalletError::InsufficientBalance {
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        let balance_after = *balance;
        inner.record(
            player_id,
            amount,
            EntryDirection::Debit,
            reason,
            balance_after,
        );
        log::debug!("wallet: debited {amount} from {player_id} ({reason})");
        Ok(balance_after)
    }

    async fn credit(
        &self,
        player_id: &str,
        amount: Chips,
        reason: EntryReason,
    ) -> WalletResult<Chips> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let mut inner = self.inner.write().await;
        let balance = inner
            .balances
            .get_mut(player_id)
            .ok_or_else(|| WalletError::UnknownAccount(player_id.to_string()))?;
        *balance += amount;
        let balance_after = *balance;
        inner.record(
            player_id,
            amount,
            EntryDirection::Credit,
            reason,
            balance_after,
        );
        log::debug!("wallet: credited {amount} to {player_id} ({reason})");
        Ok(balance_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn debit_and_credit_move_the_balance() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("alice", 500).await;

        let after = ledger.debit("alice", 100, EntryReason::BuyIn).await.unwrap();
        assert_eq!(after, 400);
        let after = ledger
            .credit("alice", 250, EntryReason::Payout)
            .await
            .unwrap();
        assert_eq!(after, 650);
        assert_eq!(ledger.balance("alice").await, Some(650));
    }

    #[tokio::test]
    async fn over_debit_is_rejected_without_an_entry() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("alice", 50).await;

        let err = ledger
            .debit("alice", 100, EntryReason::BuyIn)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientBalance {
                available: 50,
                required: 100
            }
        );
        assert_eq!(ledger.balance("alice").await, Some(50));
        assert!(ledger.entries().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_accounts_and_zero_amounts_are_rejected() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.debit("ghost", 10, EntryReason::BuyIn).await,
            Err(WalletError::UnknownAccount("ghost".to_string()))
        );
        ledger.open_account("alice", 10).await;
        assert_eq!(
            ledger.credit("alice", 0, EntryReason::Payout).await,
            Err(WalletError::InvalidAmount(0))
        );
    }

    #[tokio::test]
    async fn entries_form_an_audit_trail() {
        let ledger = InMemoryLedger::new();
        ledger.open_account("alice", 500).await;
        ledger.debit("alice", 100, EntryReason::BuyIn).await.unwrap();
        ledger
            .credit("alice", 40, EntryReason::CashOut)
            .await
            .unwrap();

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, EntryDirection::Debit);
        assert_eq!(entries[0].reason, EntryReason::BuyIn);
        assert_eq!(entries[0].balance_after, 400);
        assert_eq!(entries[1].direction, EntryDirection::Credit);
        assert_eq!(entries[1].reason, EntryReason::CashOut);
        assert_eq!(entries[1].balance_after, 440);
    }
}
