// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the shopbot configuration system.

use shopbot_config::diagnostic::ConfigError;
use shopbot_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_shop_config() {
    let toml = r#"
[bot]
name = "store"
log_level = "debug"
greeting = "hi"

[telegram]
bot_token = "123:ABC"
operator_id = 1

[storage]
database_path = "/tmp/shop.db"
wal_mode = false

[broadcast]
command = "/announce"
send_delay_ms = 50
max_sends_per_second = 20
progress_interval = 100

[relay]
evidence_prompt = "send it"
thread_ttl_secs = 86400
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "store");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.operator_id, 1);
    assert_eq!(config.storage.database_path, "/tmp/shop.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.broadcast.command, "/announce");
    assert_eq!(config.broadcast.send_delay().as_millis(), 50);
    assert_eq!(config.broadcast.max_sends_per_second, 20);
    assert_eq!(config.broadcast.progress_interval, 100);
    assert_eq!(config.relay.evidence_prompt, "send it");
    assert_eq!(config.relay.thread_ttl().map(|d| d.as_secs()), Some(86400));
    // Untouched keys keep their defaults.
    assert_eq!(
        config.relay.review_ack,
        "Payment received. Please wait while we verify it."
    );
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.broadcast.command, "/pm");
    assert_eq!(config.broadcast.send_delay_ms, 35);
    assert_eq!(config.broadcast.max_sends_per_second, 29);
    assert_eq!(config.broadcast.progress_interval, 0);
    assert!(config.relay.thread_ttl_secs.is_none());
    assert!(config.telegram.bot_token.is_none());
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[broadcast]
send_dealy_ms = 10
"#;
    let errors = load_and_validate_str(toml).expect_err("unknown key should be rejected");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "send_dealy_ms");
            assert_eq!(suggestion.as_deref(), Some("send_delay_ms"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[telegram]
operator_id = "admin"
"#;
    let errors = load_and_validate_str(toml).expect_err("string operator id should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_parsing() {
    let toml = r#"
[broadcast]
max_sends_per_second = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("zero rate should fail validation");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}
