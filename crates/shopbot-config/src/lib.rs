// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for shopbot.
//!
//! TOML files layered with Figment, `SHOPBOT_*` environment overrides,
//! strict unknown-key rejection, and miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use shopbot_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("operator: {}", config.telegram.operator_id);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ShopConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<ShopConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a specific file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<ShopConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ShopConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/shopbot/shopbot.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("shopbot/shopbot.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("shopbot.toml"));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
