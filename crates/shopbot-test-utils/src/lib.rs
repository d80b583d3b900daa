// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for shopbot integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without a Telegram
//! token or a database file.
//!
//! # Components
//!
//! - [`MockChannel`] - messaging channel with event injection and call capture
//! - [`MemoryStorage`] - in-memory store with failure toggles

pub mod memory_storage;
pub mod mock_channel;

pub use memory_storage::MemoryStorage;
pub use mock_channel::{EditRecord, MockChannel, SentRecord};
