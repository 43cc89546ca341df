//! Persistence adapter: snapshots the account aggregate into the local store.
//!
//! Reads fail open: a missing or unreadable record yields a fresh account.
//! Writes never propagate errors to the caller; failures are logged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::account::AccountState;
use crate::domain::{HistoryTrade, Order, Position, now};
use crate::storage::{KeyValueStore, StorageError};

/// Key the account is stored under unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "averix_trading_data";

/// AccountRecord is the persisted JSON layout of the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub balance: Decimal,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub history: Vec<HistoryTrade>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl AccountRecord {
    pub fn from_state(state: &AccountState) -> Self {
        Self {
            balance: state.balance(),
            positions: state.positions().to_vec(),
            orders: state.orders().to_vec(),
            history: state.history().to_vec(),
            last_updated: now(),
        }
    }

    pub fn into_state(self) -> AccountState {
        AccountState::from_parts(self.balance, self.positions, self.orders, self.history)
    }
}

/// Persistence saves and restores the account under a fixed namespace.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    initial_balance: Decimal,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>, initial_balance: Decimal) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            initial_balance,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Serializes the full account. Store failures are logged and swallowed.
    pub async fn save(&self, state: &AccountState) {
        if let Err(e) = self.try_save(state).await {
            warn!(namespace = %self.namespace, error = %e, "Failed to save account");
        }
    }

    async fn try_save(&self, state: &AccountState) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&AccountRecord::from_state(state))?;
        self.store.set(&self.namespace, &payload).await?;
        debug!(namespace = %self.namespace, bytes = payload.len(), "Account saved");
        Ok(())
    }

    /// Restores the account, defaulting to a fresh one when the record is
    /// absent, malformed or the store is unreadable.
    pub async fn load(&self) -> AccountState {
        let payload = match self.store.get(&self.namespace).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return AccountState::new(self.initial_balance),
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Failed to read account, starting fresh");
                return AccountState::new(self.initial_balance);
            }
        };

        match serde_json::from_str::<AccountRecord>(&payload) {
            Ok(record) => {
                debug!(
                    namespace = %self.namespace,
                    positions = record.positions.len(),
                    orders = record.orders.len(),
                    history = record.history.len(),
                    "Account restored"
                );
                record.into_state()
            }
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Malformed account record, starting fresh");
                AccountState::new(self.initial_balance)
            }
        }
    }

    /// Removes the persisted record. Failures are logged and swallowed.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(&self.namespace).await {
            warn!(namespace = %self.namespace, error = %e, "Failed to clear account");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::DEFAULT_INITIAL_BALANCE;
    use crate::book::PlacementLimits;
    use crate::domain::{CloseReason, OrderRequest, OrderSide, PriceSnapshot};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn persistence(store: Arc<dyn KeyValueStore>) -> Persistence {
        Persistence::new(store, DEFAULT_NAMESPACE, DEFAULT_INITIAL_BALANCE)
    }

    fn busy_account() -> AccountState {
        let prices = PriceSnapshot::initial();
        let limits = PlacementLimits::default();
        let mut account = AccountState::default();

        let long = OrderRequest::market("BTC/USDT", OrderSide::Buy, d("43200.50"), d("43350.50"), d("1"));
        account.place_order(&long, &prices, &limits).unwrap();
        account.place_order(&long, &prices, &limits).unwrap();
        let first = account.positions()[0].id.clone();
        account.apply_close(&first, d("43300.50"), CloseReason::Manual);

        let limit = OrderRequest::limit(
            "EUR/USD",
            OrderSide::Sell,
            d("1.09500"),
            d("1.09700"),
            d("1.08500"),
            d("0.5"),
        );
        account.place_order(&limit, &prices, &limits).unwrap();
        account
    }

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("quota exceeded")))
        }

        async fn close(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let persistence = persistence(Arc::new(MemoryStore::new()));
        let account = busy_account();

        persistence.save(&account).await;
        let restored = persistence.load().await;

        assert_eq!(restored, account);
        assert_eq!(restored.positions().len(), 1);
        assert_eq!(restored.orders().len(), 1);
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.balance(), d("10100"));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_every_decimal_digit() {
        let store = Arc::new(MemoryStore::new());
        let persistence = persistence(store.clone());
        let mut account = AccountState::new(d("10123.45678"));
        let long = OrderRequest::market(
            "BTC/USDT",
            OrderSide::Buy,
            d("43200.50"),
            d("43350.50"),
            d("1.23456789"),
        );
        account
            .place_order(&long, &PriceSnapshot::initial(), &PlacementLimits::default())
            .unwrap();
        assert_eq!(account.positions()[0].risk_amount, d("124.980946763907942"));

        persistence.save(&account).await;
        let restored = persistence.load().await;

        assert_eq!(restored, account);
        assert_eq!(restored.positions()[0].risk_amount, d("124.980946763907942"));

        let raw = store.get(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        assert!(raw.contains("\"balance\":10123.45678"));
    }

    #[tokio::test]
    async fn test_load_missing_record_is_fresh_account() {
        let persistence = persistence(Arc::new(MemoryStore::new()));
        assert_eq!(persistence.load().await, AccountState::default());
    }

    #[tokio::test]
    async fn test_load_malformed_record_is_fresh_account() {
        let store = Arc::new(MemoryStore::new());
        store.set(DEFAULT_NAMESPACE, "{not json").await.unwrap();

        let persistence = persistence(store.clone());
        assert_eq!(persistence.load().await, AccountState::default());

        store
            .set(DEFAULT_NAMESPACE, r#"{"balance":"lots","positions":[]}"#)
            .await
            .unwrap();
        assert_eq!(persistence.load().await, AccountState::default());
    }

    #[tokio::test]
    async fn test_layout_uses_expected_field_names() {
        let store = Arc::new(MemoryStore::new());
        let persistence = persistence(store.clone());
        persistence.save(&busy_account()).await;

        let raw = store.get(DEFAULT_NAMESPACE).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert!(value["balance"].is_number());
        assert!(value["lastUpdated"].is_i64());
        assert!(value["positions"][0]["entryPrice"].is_number());
        assert_eq!(value["positions"][0]["side"], "buy");
        assert_eq!(value["orders"][0]["type"], "limit");
        assert_eq!(value["history"][0]["reason"], "manual");
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let store = Arc::new(MemoryStore::new());
        let persistence = persistence(store.clone());
        persistence.save(&busy_account()).await;

        persistence.clear().await;

        assert_eq!(store.get(DEFAULT_NAMESPACE).await.unwrap(), None);
        assert_eq!(persistence.load().await, AccountState::default());
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let persistence = persistence(Arc::new(BrokenStore));

        persistence.save(&busy_account()).await;
        persistence.clear().await;
        assert_eq!(persistence.load().await, AccountState::default());
    }
}
