// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides which component an inbound event belongs to.

use shopbot_broadcast::parse_command_body;
use shopbot_core::types::{CallbackEvent, InboundEvent, InboundMessage, PurchaseId};
use shopbot_relay::parse_evidence_callback;

/// Where an inbound event goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Operator broadcast command.
    Broadcast,
    /// `/start`: register the subscriber and greet them.
    Start,
    /// A reply, possibly from the operator to forwarded evidence.
    Reply,
    /// A photo that may be payment evidence.
    Photo,
    /// "Send payment screenshot" button for a purchase.
    Evidence(PurchaseId),
    Ignore,
}

pub fn classify(event: &InboundEvent, command: &str) -> Route {
    match event {
        InboundEvent::Message(msg) => classify_message(msg, command),
        InboundEvent::Callback(cb) => classify_callback(cb),
    }
}

pub fn classify_message(msg: &InboundMessage, command: &str) -> Route {
    if let Some(text) = msg.text.as_deref() {
        if !msg.has_photo && parse_command_body(text, command).is_some() {
            return Route::Broadcast;
        }
        if parse_command_body(text, "/start").is_some() {
            return Route::Start;
        }
    }
    if msg.reply_to.is_some() {
        return Route::Reply;
    }
    if msg.has_photo {
        return Route::Photo;
    }
    Route::Ignore
}

pub fn classify_callback(cb: &CallbackEvent) -> Route {
    parse_evidence_callback(&cb.data).map_or(Route::Ignore, Route::Evidence)
}

#[cfg(test)]
mod tests {
    use shopbot_core::types::{ChatId, MessageId, Sender, UserId};

    use super::*;

    fn msg(text: Option<&str>, has_photo: bool, reply_to: Option<i32>) -> InboundMessage {
        InboundMessage {
            id: MessageId(1),
            chat_id: ChatId(5),
            sender: Sender {
                id: UserId(5),
                username: None,
                language_code: None,
            },
            text: text.map(str::to_string),
            has_photo,
            reply_to: reply_to.map(MessageId),
            timestamp: String::new(),
        }
    }

    #[test]
    fn broadcast_command_wins_over_reply() {
        assert_eq!(
            classify_message(&msg(Some("/pm hi"), false, Some(3)), "/pm"),
            Route::Broadcast
        );
        assert_eq!(classify_message(&msg(Some("/pm"), false, None), "/pm"), Route::Broadcast);
    }

    #[test]
    fn photo_caption_is_never_a_command() {
        assert_eq!(
            classify_message(&msg(Some("/pm hi"), true, None), "/pm"),
            Route::Photo
        );
    }

    #[test]
    fn start_command() {
        assert_eq!(classify_message(&msg(Some("/start"), false, None), "/pm"), Route::Start);
        assert_eq!(
            classify_message(&msg(Some("/start ref_42"), false, None), "/pm"),
            Route::Start
        );
        assert_eq!(classify_message(&msg(Some("/started"), false, None), "/pm"), Route::Ignore);
    }

    #[test]
    fn replies_and_photos() {
        assert_eq!(classify_message(&msg(Some("ok"), false, Some(9)), "/pm"), Route::Reply);
        assert_eq!(classify_message(&msg(None, true, Some(9)), "/pm"), Route::Reply);
        assert_eq!(classify_message(&msg(None, true, None), "/pm"), Route::Photo);
        assert_eq!(classify_message(&msg(Some("hello"), false, None), "/pm"), Route::Ignore);
    }

    #[test]
    fn callbacks() {
        let cb = |data: &str| {
            InboundEvent::Callback(CallbackEvent {
                id: "1".into(),
                sender: Sender {
                    id: UserId(5),
                    username: None,
                    language_code: None,
                },
                data: data.into(),
            })
        };
        assert_eq!(classify(&cb("send_ss_12"), "/pm"), Route::Evidence(PurchaseId(12)));
        assert_eq!(classify(&cb("buy?month=3"), "/pm"), Route::Ignore);
    }
}
