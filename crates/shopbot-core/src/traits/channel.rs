// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait: the messaging gateway consumed by the components.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, CopyRequest, InboundEvent, MessageId, OutboundMessage, ParseMode};

/// Adapter for a bidirectional messaging platform.
///
/// Every outbound call may fail independently; a returned [`MessageId`] means
/// the platform acknowledged the message, nothing more.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts receiving events from the platform.
    async fn connect(&mut self) -> Result<(), ShopError>;

    /// Receives the next inbound event.
    async fn receive(&self) -> Result<InboundEvent, ShopError>;

    /// Sends a text message.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ShopError>;

    /// Replaces the text of a message previously sent by the bot.
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), ShopError>;

    /// Copies an existing message into another chat, returning the new message id.
    async fn copy_message(&self, request: CopyRequest) -> Result<MessageId, ShopError>;
}
