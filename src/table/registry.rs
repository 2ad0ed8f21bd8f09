//! Table registry for spawning and managing multiple table actors.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{TableEvent, TableMessage, TableResponse, TableStateResponse};
use crate::game::entities::{Action, Chips};
use crate::wallet::WalletLedger;

/// Table metadata for discovery
#[derive(Debug, Clone)]
pub struct TableMetadata {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

/// Registry of all live tables, keyed by table id.
///
/// Cloning the registry is cheap; all clones share the same table map and
/// wallet. Each table runs in its own spawned task, so operations on
/// different tables never block each other.
#[derive(Clone)]
pub struct TableRegistry {
    /// Wallet ledger shared by every table
    wallet: Arc<dyn WalletLedger>,

    /// Active table handles
    tables: Arc<RwLock<HashMap<String, TableHandle>>>,
}

impl TableRegistry {
    /// Create a new table registry
    pub fn new(wallet: Arc<dyn WalletLedger>) -> Self {
        Self {
            wallet,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the handle for `table_id`, spawning a fresh table actor for it if
    /// none exists yet.
    ///
    /// Concurrent callers racing on the same id all end up with the same
    /// table: the check and insert happen under one write lock.
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `config` - Configuration used only when the table must be created
    ///
    /// # Returns
    ///
    /// * `Result<TableHandle, String>` - Table handle or error
    pub async fn get_or_create_table(
        &self,
        table_id: &str,
        config: TableConfig,
    ) -> Result<TableHandle, String> {
        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(table_id) {
            return Ok(handle.clone());
        }

        config.validate()?;

        let (actor, handle) = TableActor::new(table_id, config, self.wallet.clone());
        tables.insert(table_id.to_string(), handle.clone());
        drop(tables);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned table {}", table_id);
        Ok(handle)
    }

    /// Get a table handle
    pub async fn get_table(&self, table_id: &str) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(table_id).cloned()
    }

    /// List all active tables
    pub async fn list_tables(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = {
            let tables = self.tables.read().await;
            tables.values().cloned().collect()
        };

        let mut metadata_list = Vec::new();
        for handle in handles {
            // A table that fails to answer is being torn down; skip it.
            let Ok(state) = Self::request_state(&handle).await else {
                continue;
            };
            metadata_list.push(TableMetadata {
                id: state.table_id,
                name: state.table_name,
                player_count: state.player_count,
                max_players: state.max_players,
                small_blind: state.small_blind,
                big_blind: state.big_blind,
            });
        }
        metadata_list
    }

    /// Close a table
    ///
    /// Any seated players keep their stacks at the table; callers should have
    /// players leave first if stacks must be returned to wallets.
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    ///
    /// # Returns
    ///
    /// * `Result<(), String>` - Success or error
    pub async fn close_table(&self, table_id: &str) -> Result<(), String> {
        if let Some(handle) = self.get_table(table_id).await {
            let (tx, rx) = oneshot::channel();
            handle
                .send(TableMessage::Close { response: tx })
                .await
                .map_err(|e| format!("Failed to send close message: {}", e))?;

            rx.await
                .map_err(|_| "Failed to receive response".to_string())?;
        }

        let mut tables = self.tables.write().await;
        tables.remove(table_id);
        drop(tables);

        log::info!("Closed table {}", table_id);
        Ok(())
    }

    /// Join a table, creating it with a default configuration if it does not
    /// exist yet.
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `player_id` - Player joining
    /// * `buy_in` - Buy-in amount in chips, debited from the wallet
    ///
    /// # Returns
    ///
    /// * `Result<TableResponse, String>` - Response or error
    pub async fn join_table(
        &self,
        table_id: &str,
        player_id: &str,
        buy_in: Chips,
    ) -> Result<TableResponse, String> {
        let handle = self
            .get_or_create_table(table_id, TableConfig::default())
            .await?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Join {
                player_id: player_id.to_string(),
                buy_in,
                response: tx,
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Leave a table
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `player_id` - Player leaving
    ///
    /// # Returns
    ///
    /// * `Result<TableResponse, String>` - Response or error
    pub async fn leave_table(
        &self,
        table_id: &str,
        player_id: &str,
    ) -> Result<TableResponse, String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Leave {
                player_id: player_id.to_string(),
                response: tx,
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Submit a betting action for the player at `table_id`.
    pub async fn take_action(
        &self,
        table_id: &str,
        player_id: &str,
        action: Action,
    ) -> Result<TableResponse, String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::TakeAction {
                player_id: player_id.to_string(),
                action,
                response: tx,
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Declare the showdown winner for the hand at `table_id`.
    pub async fn resolve_showdown(
        &self,
        table_id: &str,
        winner_id: &str,
    ) -> Result<TableResponse, String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;

        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::ResolveShowdown {
                winner_id: winner_id.to_string(),
                response: tx,
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Get table state
    pub async fn get_table_state(&self, table_id: &str) -> Result<TableStateResponse, String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;
        Self::request_state(&handle).await
    }

    /// Subscribe to a table's event stream.
    ///
    /// Events are delivered through the returned receiver; delivery is
    /// fire-and-forget, and a receiver that falls more than `capacity` events
    /// behind starts losing events.
    pub async fn subscribe(
        &self,
        table_id: &str,
        subscriber_id: &str,
        capacity: usize,
    ) -> Result<mpsc::Receiver<TableEvent>, String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;

        let (tx, rx) = mpsc::channel(capacity);
        handle
            .send(TableMessage::Subscribe {
                subscriber_id: subscriber_id.to_string(),
                sender: tx,
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;
        Ok(rx)
    }

    /// Stop receiving events for `subscriber_id` at `table_id`.
    pub async fn unsubscribe(&self, table_id: &str, subscriber_id: &str) -> Result<(), String> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())?;

        handle
            .send(TableMessage::Unsubscribe {
                subscriber_id: subscriber_id.to_string(),
            })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    /// Close every table with no seated players. Returns the ids closed.
    pub async fn remove_idle_tables(&self) -> Vec<String> {
        let candidates: Vec<(String, TableHandle)> = {
            let tables = self.tables.read().await;
            tables
                .iter()
                .map(|(id, handle)| (id.clone(), handle.clone()))
                .collect()
        };

        let mut removed = Vec::new();
        for (table_id, handle) in candidates {
            match Self::request_state(&handle).await {
                Ok(state) if state.player_count == 0 => {
                    if self.close_table(&table_id).await.is_ok() {
                        removed.push(table_id);
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    // Actor already gone; drop the stale handle.
                    let mut tables = self.tables.write().await;
                    tables.remove(&table_id);
                    removed.push(table_id);
                }
            }
        }

        if !removed.is_empty() {
            log::info!("Removed {} idle table(s)", removed.len());
        }
        removed
    }

    async fn request_state(handle: &TableHandle) -> Result<TableStateResponse, String> {
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::GetState { response: tx })
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;
        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }
}
