// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for shopbot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for
//! broadcast campaigns, subscribers, and purchases.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::*;
