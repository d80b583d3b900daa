// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shopbot serve` command implementation.
//!
//! Opens SQLite storage, starts Telegram long polling, and runs the event
//! loop until SIGINT or SIGTERM. Shutdown drains in-flight handlers and
//! running broadcasts before storage is closed.

use std::sync::Arc;

use shopbot_agent::EventLoop;
use shopbot_agent::shutdown;
use shopbot_config::model::ShopConfig;
use shopbot_core::{ChannelAdapter, PluginAdapter, ShopError, StorageAdapter};
use shopbot_storage::SqliteStorage;
use shopbot_telegram::TelegramChannel;
use tracing::{error, info, warn};

/// Runs the `shopbot serve` command.
pub async fn run_serve(config: ShopConfig) -> Result<(), ShopError> {
    init_tracing(&config.bot.log_level);

    info!("starting shopbot serve");

    if config.telegram.operator_id == 0 {
        eprintln!("error: telegram.operator_id must be set to the operator's Telegram user id");
        return Err(ShopError::Config("telegram.operator_id is not set".into()));
    }

    shopbot_broadcast::metrics::register_metrics();

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let channel = {
        let mut channel = TelegramChannel::new(&config.telegram).map_err(|e| {
            error!(error = %e, "failed to initialize Telegram channel");
            eprintln!(
                "error: Telegram bot token required. Set telegram.bot_token or SHOPBOT_TELEGRAM_BOT_TOKEN"
            );
            e
        })?;
        channel.connect().await?;
        Arc::new(channel)
    };

    let cancel = shutdown::install_signal_handler();
    let event_loop = EventLoop::new(channel.clone(), storage, &config);
    let result = event_loop.run(cancel).await;

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "Telegram channel shutdown failed");
    }

    info!("shopbot serve exited");
    result
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shopbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
