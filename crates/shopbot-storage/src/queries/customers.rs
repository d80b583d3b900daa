// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber registration and enumeration.

use rusqlite::params;
use shopbot_core::ShopError;
use shopbot_core::types::UserId;

use crate::database::Database;
use crate::models::CustomerUpsert;

/// Register a subscriber, or refresh the stored language of an existing one.
///
/// Returns the customer row id.
pub async fn upsert_customer(db: &Database, customer: &CustomerUpsert) -> Result<i64, ShopError> {
    let customer = customer.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "INSERT INTO customer (telegram_id, language) VALUES (?1, ?2)
                 ON CONFLICT(telegram_id) DO UPDATE
                     SET language = COALESCE(excluded.language, customer.language)
                 RETURNING id",
                params![customer.telegram_id.0, customer.language],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every subscriber's platform id except `excluding`, in registration order.
pub async fn list_subscriber_ids(
    db: &Database,
    excluding: UserId,
) -> Result<Vec<UserId>, ShopError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT telegram_id FROM customer WHERE telegram_id != ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![excluding.0], |row| Ok(UserId(row.get(0)?)))?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
