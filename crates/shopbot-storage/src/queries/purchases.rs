// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Purchase lookups.

use rusqlite::params;
use shopbot_core::ShopError;

use crate::database::Database;
use crate::models::{Purchase, PurchaseId};

/// Look up a purchase by id.
pub async fn find_purchase_by_id(
    db: &Database,
    id: PurchaseId,
) -> Result<Option<Purchase>, ShopError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, customer_id, amount, month, invoice_type, status, created_at
                 FROM purchase WHERE id = ?1",
                params![id.0],
                |row| {
                    Ok(Purchase {
                        id: PurchaseId(row.get(0)?),
                        customer_id: row.get(1)?,
                        amount: row.get(2)?,
                        month: row.get(3)?,
                        invoice_type: row.get(4)?,
                        status: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            );
            match result {
                Ok(p) => Ok(Some(p)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a purchase for an existing customer row. Used by seeding and tests;
/// purchase creation proper belongs to the checkout flow.
pub async fn create_purchase(
    db: &Database,
    customer_id: i64,
    amount: i64,
    month: i32,
    invoice_type: &str,
) -> Result<PurchaseId, ShopError> {
    let invoice_type = invoice_type.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO purchase (customer_id, amount, month, invoice_type)
                 VALUES (?1, ?2, ?3, ?4)",
                params![customer_id, amount, month, invoice_type],
            )?;
            Ok(PurchaseId(conn.last_insert_rowid()))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::customers::upsert_customer;
    use shopbot_core::types::{CustomerUpsert, UserId};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn created_purchase_is_found() {
        let (db, _dir) = setup_db().await;
        let customer = upsert_customer(
            &db,
            &CustomerUpsert {
                telegram_id: UserId(77),
                language: None,
            },
        )
        .await
        .unwrap();
        let id = create_purchase(&db, customer, 1500, 3, "crypto").await.unwrap();

        let found = find_purchase_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.customer_id, customer);
        assert_eq!(found.month, 3);
        assert_eq!(found.invoice_type, "crypto");
        assert_eq!(found.status, "new");
    }

    #[tokio::test]
    async fn missing_purchase_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(find_purchase_by_id(&db, PurchaseId(5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purchase_requires_existing_customer() {
        let (db, _dir) = setup_db().await;
        let err = create_purchase(&db, 12345, 100, 1, "crypto").await;
        assert!(err.is_err());
    }
}
