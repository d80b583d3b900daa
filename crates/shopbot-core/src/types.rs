// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the shopbot components.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

numeric_id!(
    /// Platform identity of a person talking to the bot.
    UserId(i64)
);
numeric_id!(
    /// Destination chat. For private chats this equals the user's id.
    ChatId(i64)
);
numeric_id!(
    /// Identifier of a message within a chat, as assigned by the platform.
    MessageId(i32)
);
numeric_id!(
    /// Store-assigned identifier of a broadcast campaign.
    BroadcastId(i64)
);
numeric_id!(
    /// Store-assigned identifier of a purchase.
    PurchaseId(i64)
);

impl From<UserId> for ChatId {
    fn from(user: UserId) -> Self {
        ChatId(user.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Broadcast campaigns ---

/// Lifecycle state of a broadcast campaign.
///
/// The only legal transitions are `Pending -> Sent` and `Pending -> Failed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Pending,
    Sent,
    Failed,
}

impl BroadcastStatus {
    /// Returns `true` for `Sent` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, BroadcastStatus::Pending)
    }

    /// Whether a campaign in `self` may be moved to `next`.
    pub fn can_transition_to(self, next: BroadcastStatus) -> bool {
        self == BroadcastStatus::Pending && next.is_terminal()
    }

    /// Rolls per-recipient outcomes up into a terminal status.
    ///
    /// A campaign is `Failed` only when every attempted recipient failed and
    /// there was at least one attempt. Partial failure is still `Sent`.
    pub fn rollup(total: usize, failed: usize) -> BroadcastStatus {
        if failed > 0 && failed == total {
            BroadcastStatus::Failed
        } else {
            BroadcastStatus::Sent
        }
    }
}

/// A broadcast campaign as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    pub id: BroadcastId,
    pub sender_id: UserId,
    pub message: String,
    /// Store-assigned creation timestamp (ISO 8601).
    pub sent_at: String,
    pub status: BroadcastStatus,
}

/// Fields supplied by the caller when creating a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBroadcast {
    pub sender_id: UserId,
    pub message: String,
}

// --- Shop records ---

/// A purchase row, read-only from the point of view of this workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub customer_id: i64,
    pub amount: i64,
    /// Tariff length in months.
    pub month: i32,
    pub invoice_type: String,
    pub status: String,
    pub created_at: String,
}

/// A subscriber registration or refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerUpsert {
    pub telegram_id: UserId,
    pub language: Option<String>,
}

// --- Messaging ---

/// Text formatting applied by the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    Plain,
    Html,
    MarkdownV2,
}

/// The person behind an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// A message received from the platform, reduced to what the components need.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: Sender,
    /// Message text, or the caption when the message carries media.
    pub text: Option<String>,
    pub has_photo: bool,
    /// The message this one replies to, if any.
    pub reply_to: Option<MessageId>,
    pub timestamp: String,
}

/// A button press carrying callback data.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEvent {
    pub id: String,
    pub sender: Sender,
    pub data: String,
}

/// Everything the channel adapter hands to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(InboundMessage),
    Callback(CallbackEvent),
}

/// A text message to be delivered by a channel adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: ParseMode,
}

impl OutboundMessage {
    /// A plain-text message.
    pub fn plain(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    /// An HTML-formatted message.
    pub fn html(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: ParseMode::Html,
        }
    }
}

/// Request to copy an existing message into another chat.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyRequest {
    pub from_chat: ChatId,
    pub message_id: MessageId,
    pub to_chat: ChatId,
    /// Replaces the caption of the copied media when set.
    pub caption: Option<String>,
}
