// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts Figment errors into miette diagnostics with "did you mean?" hints.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
///
/// Key-level variants carry the offending file and span when the value came
/// from a TOML file, so miette can underline it.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(shopbot::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Key as written, e.g. `comand`.
        key: String,
        /// Closest valid key in the same section.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(shopbot::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `broadcast.send_delay_ms`.
        key: String,
        /// Found and expected types as figment reports them.
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(shopbot::config::missing_key),
        help("add `{key} = <value>` to your shopbot.toml")
    )]
    MissingKey {
        /// Field name without its section.
        key: String,
    },

    /// A semantic validation failure, see [`crate::validation`].
    #[error("validation error: {message}")]
    #[diagnostic(code(shopbot::config::validation))]
    Validation {
        /// Names the offending key and the accepted range.
        message: String,
    },

    /// Anything else Figment reports.
    #[error("configuration error: {0}")]
    #[diagnostic(code(shopbot::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs file paths with their contents so unknown keys can be
/// pointed at in the source.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let (span, src) = match error.path.last() {
                    Some(field) => locate_key(&error, field, toml_sources),
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: error.path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(path) = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        })
    else {
        return (None, None);
    };

    let Some((name, content)) = toml_sources.iter().find(|(p, _)| *p == path) else {
        return (None, None);
    };

    match find_key_offset(content, &error.path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside the `[section]` named by the first path element.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Best Jaro-Winkler match above [`SUGGESTION_THRESHOLD`], if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = &["send_delay_ms", "max_sends_per_second", "command"];
        assert_eq!(
            suggest_key("send_dealy_ms", valid),
            Some("send_delay_ms".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        let valid = &["bot_token", "operator_id"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_inside_section() {
        let content = "[bot]\nname = \"x\"\n[broadcast]\ncomand = \"/pm\"\n";
        let offset = find_key_offset(content, &["broadcast".to_string()], "comand").unwrap();
        assert_eq!(&content[offset..offset + 6], "comand");
    }

    #[test]
    fn invalid_type_points_at_the_key() {
        use figment::Figment;
        use figment::providers::{Format, Toml};

        use crate::model::ShopConfig;

        figment::Jail::expect_with(|jail| {
            let content = "[broadcast]\nsend_delay_ms = \"fast\"\n";
            jail.create_file("shopbot.toml", content)?;
            let err = Figment::from(Toml::file("shopbot.toml"))
                .extract::<ShopConfig>()
                .unwrap_err();
            let path = err
                .metadata
                .as_ref()
                .and_then(|m| m.source.as_ref())
                .and_then(|s| s.file_path())
                .map(|p| p.display().to_string())
                .unwrap();

            let errors = figment_to_config_errors(err, &[(path, content.to_string())]);
            let Some(ConfigError::InvalidType {
                key,
                span: Some(span),
                src: Some(_),
                ..
            }) = errors.first()
            else {
                panic!("expected a located type error, got {errors:?}");
            };
            assert_eq!(key, "broadcast.send_delay_ms");
            assert_eq!(
                &content[span.offset()..span.offset() + span.len()],
                "send_delay_ms"
            );
            Ok(())
        });
    }

    #[test]
    fn missing_section_has_no_offset() {
        let content = "[bot]\nname = \"x\"\n";
        assert!(find_key_offset(content, &["relay".to_string()], "name").is_none());
    }
}
