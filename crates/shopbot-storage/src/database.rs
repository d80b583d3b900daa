// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do NOT open additional connections for writes.

use std::path::Path;

use shopbot_core::ShopError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into [`ShopError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ShopError {
    ShopError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, ShopError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`] but lets the caller keep the rollback journal.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ShopError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ShopError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ShopError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| Ok::<_, rusqlite::Error>(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// The underlying connection. Query modules call through `connection().call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), ShopError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and drop the connection.
    pub async fn close(self) -> Result<(), ShopError> {
        self.checkpoint().await?;
        debug!("database closed");
        Ok(())
    }
}
