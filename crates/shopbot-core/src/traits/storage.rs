// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Broadcast, BroadcastId, BroadcastStatus, CustomerUpsert, NewBroadcast, Purchase, PurchaseId,
    UserId,
};

/// Adapter for the persistent store.
///
/// Each call is independent; callers never rely on a transaction spanning
/// more than one method.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the backend (migrations, connection).
    async fn initialize(&self) -> Result<(), ShopError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), ShopError>;

    // --- Broadcast campaigns ---

    /// Inserts a `pending` campaign and returns it with its id and timestamp.
    async fn create_broadcast(&self, broadcast: &NewBroadcast) -> Result<Broadcast, ShopError>;

    /// Moves a `pending` campaign to a terminal status.
    ///
    /// Fails with [`ShopError::InvalidTransition`] when the campaign is already
    /// terminal and [`ShopError::NotFound`] when it does not exist.
    async fn update_broadcast_status(
        &self,
        id: BroadcastId,
        status: BroadcastStatus,
    ) -> Result<(), ShopError>;

    /// Fetches one campaign.
    async fn get_broadcast(&self, id: BroadcastId) -> Result<Option<Broadcast>, ShopError>;

    /// Most recent campaigns first.
    async fn list_broadcasts(&self, limit: usize) -> Result<Vec<Broadcast>, ShopError>;

    // --- Subscribers and purchases ---

    /// All known subscriber ids except `excluding`, in store order.
    async fn list_subscriber_ids(&self, excluding: UserId) -> Result<Vec<UserId>, ShopError>;

    /// Registers a subscriber or refreshes its language.
    async fn upsert_customer(&self, customer: &CustomerUpsert) -> Result<(), ShopError>;

    /// Looks up a purchase.
    async fn find_purchase_by_id(&self, id: PurchaseId) -> Result<Option<Purchase>, ShopError>;
}
