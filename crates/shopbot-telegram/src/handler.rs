// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic inbound events.
//!
//! Only private chats are served; group traffic never reaches the components.

use shopbot_core::types::{
    CallbackEvent, ChatId, InboundMessage, MessageId, Sender, UserId,
};
use teloxide::types::{CallbackQuery, ChatKind, Message, User};

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Maps a Telegram user to the sender identity used by the components.
pub fn to_sender(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Converts a Telegram message into an [`InboundMessage`].
///
/// Returns `None` for messages without a sender (channel posts). Media
/// captions are surfaced as `text`.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let sender = to_sender(msg.from.as_ref()?);
    let text = msg.text().or_else(|| msg.caption()).map(str::to_string);

    Some(InboundMessage {
        id: MessageId(msg.id.0),
        chat_id: ChatId(msg.chat.id.0),
        sender,
        text,
        has_photo: msg.photo().is_some(),
        reply_to: msg.reply_to_message().map(|m| MessageId(m.id.0)),
        timestamp: chrono::DateTime::to_rfc3339(&msg.date),
    })
}

/// Converts a button press into a [`CallbackEvent`]. Presses without data
/// (game buttons) yield `None`.
pub fn to_callback_event(query: &CallbackQuery) -> Option<CallbackEvent> {
    let data = query.data.clone()?;
    Some(CallbackEvent {
        id: query.id.to_string(),
        sender: to_sender(&query.from),
        data,
    })
}
