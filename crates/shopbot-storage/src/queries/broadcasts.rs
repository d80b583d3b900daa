// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast campaign records.

use rusqlite::params;
use rusqlite::types::Type;
use shopbot_core::ShopError;
use shopbot_core::types::UserId;

use crate::database::Database;
use crate::models::{Broadcast, BroadcastId, BroadcastStatus, NewBroadcast};

fn row_to_broadcast(row: &rusqlite::Row<'_>) -> rusqlite::Result<Broadcast> {
    let status: String = row.get(4)?;
    let status = status
        .parse::<BroadcastStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Broadcast {
        id: BroadcastId(row.get(0)?),
        sender_id: UserId(row.get(1)?),
        message: row.get(2)?,
        sent_at: row.get(3)?,
        status,
    })
}

/// Insert a `pending` campaign. The store assigns the id and `sent_at`.
pub async fn create_broadcast(db: &Database, new: &NewBroadcast) -> Result<Broadcast, ShopError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            let (id, sent_at): (i64, String) = conn.query_row(
                "INSERT INTO broadcast (sender_id, message, status)
                 VALUES (?1, ?2, 'pending')
                 RETURNING id, sent_at",
                params![new.sender_id.0, new.message],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(Broadcast {
                id: BroadcastId(id),
                sender_id: new.sender_id,
                message: new.message,
                sent_at,
                status: BroadcastStatus::Pending,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one campaign by id.
pub async fn get_broadcast(db: &Database, id: BroadcastId) -> Result<Option<Broadcast>, ShopError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, sender_id, message, sent_at, status FROM broadcast WHERE id = ?1",
                params![id.0],
                row_to_broadcast,
            );
            match result {
                Ok(b) => Ok(Some(b)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent campaigns first, at most `limit` rows.
pub async fn list_broadcasts(db: &Database, limit: usize) -> Result<Vec<Broadcast>, ShopError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, message, sent_at, status
                 FROM broadcast ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_broadcast)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Result of the guarded read-then-write inside the status transaction.
enum StatusWrite {
    Written,
    Missing,
    Rejected(BroadcastStatus),
}

/// Move a `pending` campaign to `status`.
///
/// The current status is read and written in one transaction so a second
/// terminal write can never overwrite the first.
pub async fn update_broadcast_status(
    db: &Database,
    id: BroadcastId,
    status: BroadcastStatus,
) -> Result<(), ShopError> {
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let current = {
                let result = tx.query_row(
                    "SELECT status FROM broadcast WHERE id = ?1",
                    params![id.0],
                    row_to_status,
                );
                match result {
                    Ok(s) => Some(s),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };
            let outcome = match current {
                None => StatusWrite::Missing,
                Some(current) if !current.can_transition_to(status) => {
                    StatusWrite::Rejected(current)
                }
                Some(_) => {
                    tx.execute(
                        "UPDATE broadcast SET status = ?1 WHERE id = ?2",
                        params![status.to_string(), id.0],
                    )?;
                    StatusWrite::Written
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        StatusWrite::Written => Ok(()),
        StatusWrite::Missing => Err(ShopError::NotFound {
            entity: "broadcast",
            id: id.0,
        }),
        StatusWrite::Rejected(current) => Err(ShopError::InvalidTransition {
            from: current.to_string(),
            to: status.to_string(),
        }),
    }
}

fn row_to_status(row: &rusqlite::Row<'_>) -> rusqlite::Result<BroadcastStatus> {
    let status: String = row.get(0)?;
    status
        .parse::<BroadcastStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}
