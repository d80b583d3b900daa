// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./shopbot.toml` > `~/.config/shopbot/shopbot.toml` >
//! `/etc/shopbot/shopbot.toml`, with `SHOPBOT_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShopConfig;

/// Config sections that env var names are split on.
const SECTIONS: &[&str] = &["bot", "telegram", "storage", "broadcast", "relay"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shopbot/shopbot.toml`
/// 3. `~/.config/shopbot/shopbot.toml`
/// 4. `./shopbot.toml`
/// 5. `SHOPBOT_*` environment variables
pub fn load_config() -> Result<ShopConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ShopConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShopConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::file("/etc/shopbot/shopbot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("shopbot/shopbot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("shopbot.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `SHOPBOT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `SHOPBOT_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token`.
fn env_provider() -> Env {
    Env::prefixed("SHOPBOT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(
            map_env_key("broadcast_send_delay_ms"),
            "broadcast.send_delay_ms"
        );
        assert_eq!(map_env_key("relay_thread_ttl_secs"), "relay.thread_ttl_secs");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[telegram]\noperator_id = 5\n")?;
            jail.set_env("SHOPBOT_TELEGRAM_OPERATOR_ID", "9");
            jail.set_env("SHOPBOT_BROADCAST_SEND_DELAY_MS", "50");
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.telegram.operator_id, 9);
            assert_eq!(config.broadcast.send_delay_ms, 50);
            Ok(())
        });
    }
}
