// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level shopbot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShopConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram credentials and the operator identity.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Broadcast engine settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Manual-payment relay settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reply to `/start` after the customer has been registered.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            greeting: default_greeting(),
        }
    }
}

fn default_bot_name() -> String {
    "shopbot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_greeting() -> String {
    "Welcome! You are subscribed to shop announcements.".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `shopbot serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user id of the operator allowed to broadcast and review payments.
    #[serde(default)]
    pub operator_id: i64,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("shopbot").join("shopbot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("shopbot.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Broadcast engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Command token that starts a broadcast, e.g. `/pm`.
    #[serde(default = "default_command")]
    pub command: String,

    /// Pause between two consecutive sends of one campaign, in milliseconds.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,

    /// Ceiling on sends per second shared by all running campaigns.
    #[serde(default = "default_max_sends_per_second")]
    pub max_sends_per_second: u32,

    /// Edit the acknowledgment with progress every N attempts. `0` disables it.
    #[serde(default)]
    pub progress_interval: usize,

    /// Sent to the operator when the command carries no text.
    #[serde(default = "default_usage_text")]
    pub usage_text: String,

    /// Sent to the operator once the campaign has been recorded.
    #[serde(default = "default_ack_text")]
    pub ack_text: String,

    /// Sent to the operator when the campaign cannot be recorded.
    #[serde(default = "default_failure_text")]
    pub failure_text: String,

    /// Sent to the operator when the subscriber list cannot be loaded.
    #[serde(default = "default_recipients_failure_text")]
    pub recipients_failure_text: String,
}

impl BroadcastConfig {
    /// The per-campaign inter-send delay.
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            send_delay_ms: default_send_delay_ms(),
            max_sends_per_second: default_max_sends_per_second(),
            progress_interval: 0,
            usage_text: default_usage_text(),
            ack_text: default_ack_text(),
            failure_text: default_failure_text(),
            recipients_failure_text: default_recipients_failure_text(),
        }
    }
}

fn default_command() -> String {
    "/pm".to_string()
}

fn default_send_delay_ms() -> u64 {
    // Telegram allows roughly 30 messages per second; 35ms keeps us under 29.
    35
}

fn default_max_sends_per_second() -> u32 {
    29
}

fn default_usage_text() -> String {
    "Usage: `/pm message text`\nThe text will be sent to every bot user.".to_string()
}

fn default_ack_text() -> String {
    "Starting broadcast to all users...".to_string()
}

fn default_failure_text() -> String {
    "Failed to create the broadcast.".to_string()
}

fn default_recipients_failure_text() -> String {
    "Failed to load the subscriber list.".to_string()
}

/// Manual-payment relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Prompt sent when a user chooses to submit payment evidence.
    #[serde(default = "default_evidence_prompt")]
    pub evidence_prompt: String,

    /// Acknowledgment sent to the user once evidence reached the operator.
    #[serde(default = "default_review_ack")]
    pub review_ack: String,

    /// Confirmation sent to the operator after a reply was relayed.
    #[serde(default = "default_delivered_ack")]
    pub delivered_ack: String,

    /// Forget reply threads older than this many seconds. Unset keeps them forever.
    #[serde(default)]
    pub thread_ttl_secs: Option<u64>,
}

impl RelayConfig {
    /// The reply-thread retention window, if any.
    pub fn thread_ttl(&self) -> Option<Duration> {
        self.thread_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            evidence_prompt: default_evidence_prompt(),
            review_ack: default_review_ack(),
            delivered_ack: default_delivered_ack(),
            thread_ttl_secs: None,
        }
    }
}

fn default_evidence_prompt() -> String {
    "Please attach the transaction screenshot now.".to_string()
}

fn default_review_ack() -> String {
    "Payment received. Please wait while we verify it.".to_string()
}

fn default_delivered_ack() -> String {
    "✅ Sent to the user".to_string()
}
