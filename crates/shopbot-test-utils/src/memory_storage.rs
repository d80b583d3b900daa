// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `StorageAdapter` with failure toggles and a mutation counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use shopbot_core::traits::adapter::PluginAdapter;
use shopbot_core::traits::storage::StorageAdapter;
use shopbot_core::types::{
    AdapterType, Broadcast, BroadcastId, BroadcastStatus, CustomerUpsert, HealthStatus,
    NewBroadcast, Purchase, PurchaseId, UserId,
};
use shopbot_core::ShopError;

#[derive(Default)]
struct State {
    broadcasts: Vec<Broadcast>,
    /// Registration order is store order.
    customers: Vec<(UserId, Option<String>)>,
    purchases: HashMap<PurchaseId, Purchase>,
}

/// A storage double that keeps everything in memory.
///
/// Every successful write bumps [`MemoryStorage::mutations`]. The `fail_*`
/// toggles make the matching operation return [`ShopError::Storage`].
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    mutations: AtomicUsize,
    status_writes: AtomicUsize,
    fail_create: AtomicBool,
    fail_subscribers: AtomicBool,
    fail_status: AtomicBool,
}

fn injected(op: &str) -> ShopError {
    ShopError::Storage {
        source: format!("injected {op} failure").into(),
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register subscribers without counting them as mutations.
    pub async fn add_subscribers(&self, ids: impl IntoIterator<Item = i64>) {
        let mut state = self.state.lock().await;
        for id in ids {
            if !state.customers.iter().any(|(c, _)| c.0 == id) {
                state.customers.push((UserId(id), None));
            }
        }
    }

    /// Seed a purchase without counting it as a mutation.
    pub async fn insert_purchase(&self, purchase: Purchase) {
        self.state
            .lock()
            .await
            .purchases
            .insert(purchase.id, purchase);
    }

    /// Number of successful writes.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Number of `update_broadcast_status` calls, successful or not.
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscribers(&self, fail: bool) {
        self.fail_subscribers.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Stored language of a customer, if registered.
    pub async fn customer_language(&self, id: UserId) -> Option<Option<String>> {
        self.state
            .lock()
            .await
            .customers
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, lang)| lang.clone())
    }

    /// Snapshot of every stored campaign in creation order.
    pub async fn broadcasts(&self) -> Vec<Broadcast> {
        self.state.lock().await.broadcasts.clone()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), ShopError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ShopError> {
        Ok(())
    }

    async fn create_broadcast(&self, new: &NewBroadcast) -> Result<Broadcast, ShopError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(injected("create_broadcast"));
        }
        let mut state = self.state.lock().await;
        let broadcast = Broadcast {
            id: BroadcastId(state.broadcasts.len() as i64 + 1),
            sender_id: new.sender_id,
            message: new.message.clone(),
            sent_at: chrono::Utc::now().to_rfc3339(),
            status: BroadcastStatus::Pending,
        };
        state.broadcasts.push(broadcast.clone());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(broadcast)
    }

    async fn update_broadcast_status(
        &self,
        id: BroadcastId,
        status: BroadcastStatus,
    ) -> Result<(), ShopError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(injected("update_broadcast_status"));
        }
        let mut state = self.state.lock().await;
        let record = state
            .broadcasts
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ShopError::NotFound {
                entity: "broadcast",
                id: id.0,
            })?;
        if !record.status.can_transition_to(status) {
            return Err(ShopError::InvalidTransition {
                from: record.status.to_string(),
                to: status.to_string(),
            });
        }
        record.status = status;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_broadcast(&self, id: BroadcastId) -> Result<Option<Broadcast>, ShopError> {
        Ok(self
            .state
            .lock()
            .await
            .broadcasts
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn list_broadcasts(&self, limit: usize) -> Result<Vec<Broadcast>, ShopError> {
        Ok(self
            .state
            .lock()
            .await
            .broadcasts
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_subscriber_ids(&self, excluding: UserId) -> Result<Vec<UserId>, ShopError> {
        if self.fail_subscribers.load(Ordering::SeqCst) {
            return Err(injected("list_subscriber_ids"));
        }
        Ok(self
            .state
            .lock()
            .await
            .customers
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| *id != excluding)
            .collect())
    }

    async fn upsert_customer(&self, customer: &CustomerUpsert) -> Result<(), ShopError> {
        let mut state = self.state.lock().await;
        match state
            .customers
            .iter_mut()
            .find(|(id, _)| *id == customer.telegram_id)
        {
            Some((_, lang)) => {
                if customer.language.is_some() {
                    *lang = customer.language.clone();
                }
            }
            None => state
                .customers
                .push((customer.telegram_id, customer.language.clone())),
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_purchase_by_id(&self, id: PurchaseId) -> Result<Option<Purchase>, ShopError> {
        Ok(self.state.lock().await.purchases.get(&id).cloned())
    }
}
