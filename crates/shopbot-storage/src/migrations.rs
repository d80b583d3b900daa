// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied on
//! every [`Database::open`](crate::Database::open).

use shopbot_core::ShopError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ShopError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ShopError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
