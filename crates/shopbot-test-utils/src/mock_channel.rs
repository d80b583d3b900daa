// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound calls for assertion in tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use shopbot_core::ShopError;
use shopbot_core::traits::adapter::PluginAdapter;
use shopbot_core::traits::channel::ChannelAdapter;
use shopbot_core::types::{
    AdapterType, ChatId, CopyRequest, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    ParseMode,
};

/// A send captured by the mock, with the (tokio) instant it happened.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub message: OutboundMessage,
    pub at: Instant,
}

/// An `edit_text` call captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecord {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub parse_mode: ParseMode,
}

/// A mock messaging channel for testing.
///
/// Inbound events injected via `inject_event()` are returned by `receive()`.
/// Sends, edits and copies are captured in call order. Chats registered with
/// `fail_chat()` reject sends and copies addressed to them.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    notify: Arc<Notify>,
    sent: Mutex<Vec<SentRecord>>,
    edits: Mutex<Vec<EditRecord>>,
    copies: Mutex<Vec<CopyRequest>>,
    failing: Mutex<HashSet<ChatId>>,
    fail_edits: AtomicBool,
    next_id: AtomicI32,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            copies: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            fail_edits: AtomicBool::new(false),
            next_id: AtomicI32::new(1000),
        }
    }

    /// Inject an inbound event; the next `receive()` returns it.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Make every send or copy addressed to `chat` fail.
    pub async fn fail_chat(&self, chat: impl Into<ChatId>) {
        self.failing.lock().await.insert(chat.into());
    }

    /// Make every `edit_text` call fail.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// All sends that were attempted, including rejected ones, in call order.
    pub async fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().await.clone()
    }

    /// The outbound messages alone.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Texts sent to one chat, in order.
    pub async fn texts_to(&self, chat: impl Into<ChatId>) -> Vec<String> {
        let chat = chat.into();
        self.sent
            .lock()
            .await
            .iter()
            .filter(|r| r.message.chat_id == chat)
            .map(|r| r.message.text.clone())
            .collect()
    }

    /// Number of sends attempted.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Captured edits.
    pub async fn edits(&self) -> Vec<EditRecord> {
        self.edits.lock().await.clone()
    }

    /// Captured copy requests, including rejected ones.
    pub async fn copies(&self) -> Vec<CopyRequest> {
        self.copies.lock().await.clone()
    }

    /// Total number of outbound calls of any kind.
    pub async fn call_count(&self) -> usize {
        self.sent.lock().await.len() + self.edits.lock().await.len() + self.copies.lock().await.len()
    }

    /// The id the next successful outbound call will return.
    pub fn peek_next_id(&self) -> MessageId {
        MessageId(self.next_id.load(Ordering::SeqCst))
    }

    fn allocate_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), ShopError> {
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, ShopError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ShopError> {
        let chat = msg.chat_id;
        self.sent.lock().await.push(SentRecord {
            message: msg,
            at: Instant::now(),
        });
        if self.failing.lock().await.contains(&chat) {
            return Err(ShopError::channel(format!(
                "failed to send message: chat {chat} unreachable"
            )));
        }
        Ok(self.allocate_id())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), ShopError> {
        self.edits.lock().await.push(EditRecord {
            chat_id,
            message_id,
            text: text.to_string(),
            parse_mode,
        });
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(ShopError::channel("failed to edit message"));
        }
        Ok(())
    }

    async fn copy_message(&self, request: CopyRequest) -> Result<MessageId, ShopError> {
        let to = request.to_chat;
        self.copies.lock().await.push(request);
        if self.failing.lock().await.contains(&to) {
            return Err(ShopError::channel(format!(
                "failed to copy message: chat {to} unreachable"
            )));
        }
        Ok(self.allocate_id())
    }
}
