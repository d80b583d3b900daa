// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use shopbot_config::model::StorageConfig;
use shopbot_core::types::{
    Broadcast, BroadcastId, BroadcastStatus, CustomerUpsert, NewBroadcast, Purchase, PurchaseId,
    UserId,
};
use shopbot_core::{AdapterType, HealthStatus, PluginAdapter, ShopError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// The underlying database, once initialized.
    pub fn database(&self) -> Result<&Database, ShopError> {
        self.db.get().ok_or_else(|| ShopError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ShopError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ShopError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ShopError> {
        self.database()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn create_broadcast(&self, broadcast: &NewBroadcast) -> Result<Broadcast, ShopError> {
        queries::broadcasts::create_broadcast(self.database()?, broadcast).await
    }

    async fn update_broadcast_status(
        &self,
        id: BroadcastId,
        status: BroadcastStatus,
    ) -> Result<(), ShopError> {
        queries::broadcasts::update_broadcast_status(self.database()?, id, status).await
    }

    async fn get_broadcast(&self, id: BroadcastId) -> Result<Option<Broadcast>, ShopError> {
        queries::broadcasts::get_broadcast(self.database()?, id).await
    }

    async fn list_broadcasts(&self, limit: usize) -> Result<Vec<Broadcast>, ShopError> {
        queries::broadcasts::list_broadcasts(self.database()?, limit).await
    }

    async fn list_subscriber_ids(&self, excluding: UserId) -> Result<Vec<UserId>, ShopError> {
        queries::customers::list_subscriber_ids(self.database()?, excluding).await
    }

    async fn upsert_customer(&self, customer: &CustomerUpsert) -> Result<(), ShopError> {
        queries::customers::upsert_customer(self.database()?, customer).await?;
        Ok(())
    }

    async fn find_purchase_by_id(&self, id: PurchaseId) -> Result<Option<Purchase>, ShopError> {
        queries::purchases::find_purchase_by_id(self.database()?, id).await
    }
}
