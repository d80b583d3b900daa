// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the shopbot workspace.
//!
//! Provides the error type, the domain types shared by the broadcast engine
//! and the relay coordinator, and the adapter traits implemented by the
//! Telegram and SQLite crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ShopError;
pub use types::{
    AdapterType, Broadcast, BroadcastId, BroadcastStatus, ChatId, HealthStatus, MessageId,
    PurchaseId, UserId,
};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};
