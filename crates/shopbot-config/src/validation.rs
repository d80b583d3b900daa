// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ShopConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &ShopConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.bot.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "bot.log_level `{}` must be one of {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.telegram.operator_id < 0 {
        fail(format!(
            "telegram.operator_id must be a positive user id, got {}",
            config.telegram.operator_id
        ));
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        fail("telegram.bot_token must not be empty when set".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let command = &config.broadcast.command;
    if !command.starts_with('/') || command.len() < 2 || command.contains(char::is_whitespace) {
        fail(format!(
            "broadcast.command `{command}` must be a single token starting with `/`"
        ));
    }

    if config.broadcast.max_sends_per_second == 0 {
        fail("broadcast.max_sends_per_second must be at least 1".to_string());
    }

    if config.relay.thread_ttl_secs == Some(0) {
        fail("relay.thread_ttl_secs must be positive when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
