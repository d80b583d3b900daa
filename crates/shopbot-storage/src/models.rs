// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities, re-exported from `shopbot-core`.

pub use shopbot_core::types::{
    Broadcast, BroadcastId, BroadcastStatus, CustomerUpsert, NewBroadcast, Purchase, PurchaseId,
};
