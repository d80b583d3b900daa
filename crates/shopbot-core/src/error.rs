// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every shopbot crate.

use thiserror::Error;

/// The primary error type used across all shopbot adapter traits and components.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing token, invalid operator id).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging gateway errors (send, edit or copy rejected by the platform).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A campaign status write that would leave a terminal state.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Builds a [`ShopError::Channel`] without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        ShopError::Channel {
            message: message.into(),
            source: None,
        }
    }
}
