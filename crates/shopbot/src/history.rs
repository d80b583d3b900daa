// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shopbot broadcasts` command implementation.

use shopbot_config::model::ShopConfig;
use shopbot_core::{Broadcast, ShopError, StorageAdapter};
use shopbot_storage::SqliteStorage;

const PREVIEW_CHARS: usize = 48;

/// Prints the most recent campaigns, newest first.
pub async fn run_broadcasts(config: &ShopConfig, limit: usize) -> Result<(), ShopError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let campaigns = storage.list_broadcasts(limit).await?;
    storage.close().await?;

    if campaigns.is_empty() {
        println!("no broadcasts yet");
        return Ok(());
    }
    for line in campaigns.iter().map(format_row) {
        println!("{line}");
    }
    Ok(())
}

fn format_row(campaign: &Broadcast) -> String {
    format!(
        "{:>6}  {:<7}  {}  {}",
        campaign.id,
        campaign.status,
        campaign.sent_at,
        preview(&campaign.message)
    )
}

/// First line of the body, cut to [`PREVIEW_CHARS`] characters.
fn preview(body: &str) -> String {
    let line = body.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS || body.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}
