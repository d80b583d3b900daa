// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for shopbot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for messages and button presses, plus send, edit and copy.

pub mod handler;

use async_trait::async_trait;
use shopbot_config::model::TelegramConfig;
use shopbot_core::error::ShopError;
use shopbot_core::traits::{ChannelAdapter, PluginAdapter};
use shopbot_core::types::{
    AdapterType, ChatId, CopyRequest, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    ParseMode,
};
use teloxide::prelude::*;
use teloxide::types::ParseMode as TgParseMode;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Private-chat messages and callback queries are converted by [`handler`]
/// and queued for [`ChannelAdapter::receive`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ShopError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ShopError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(ShopError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn tg_message(id: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(id.0)
}

fn tg_parse_mode(mode: ParseMode) -> Option<TgParseMode> {
    match mode {
        ParseMode::Plain => None,
        ParseMode::Html => Some(TgParseMode::Html),
        ParseMode::MarkdownV2 => Some(TgParseMode::MarkdownV2),
    }
}

fn channel_err(action: &str, e: teloxide::RequestError) -> ShopError {
    ShopError::Channel {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ShopError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = msg_tx.clone();
                    async move {
                        if !handler::is_dm(&msg) {
                            debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                            return respond(());
                        }
                        match handler::to_inbound_message(&msg) {
                            Some(inbound) => {
                                if tx.send(InboundEvent::Message(inbound)).await.is_err() {
                                    warn!("inbound channel closed, dropping message");
                                }
                            }
                            None => debug!(msg_id = msg.id.0, "ignoring message without sender"),
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = cb_tx.clone();
                        async move {
                            // Dismiss the button spinner whether or not we act on it.
                            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                                debug!(error = %e, "failed to answer callback query");
                            }
                            if let Some(event) = handler::to_callback_event(&query)
                                && tx.send(InboundEvent::Callback(event)).await.is_err()
                            {
                                warn!("inbound channel closed, dropping callback");
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, ShopError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| ShopError::channel("Telegram inbound channel closed"))
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ShopError> {
        let mut request = self.bot.send_message(tg_chat(msg.chat_id), msg.text);
        if let Some(mode) = tg_parse_mode(msg.parse_mode) {
            request = request.parse_mode(mode);
        }
        let sent = request
            .await
            .map_err(|e| channel_err("send message", e))?;
        Ok(MessageId(sent.id.0))
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<(), ShopError> {
        let mut request =
            self.bot
                .edit_message_text(tg_chat(chat_id), tg_message(message_id), text);
        if let Some(mode) = tg_parse_mode(parse_mode) {
            request = request.parse_mode(mode);
        }
        match request.await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(channel_err("edit message", e)),
        }
    }

    async fn copy_message(&self, request: CopyRequest) -> Result<MessageId, ShopError> {
        let mut call = self.bot.copy_message(
            tg_chat(request.to_chat),
            tg_chat(request.from_chat),
            tg_message(request.message_id),
        );
        if let Some(caption) = request.caption {
            call = call.caption(caption);
        }
        let copied = call.await.map_err(|e| channel_err("copy message", e))?;
        Ok(MessageId(copied.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            operator_id: 1,
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramChannel::new(&config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramChannel::new(&config(Some(""))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        assert!(TelegramChannel::new(&config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11"))).is_ok());
    }

    #[test]
    fn parse_mode_mapping() {
        assert_eq!(tg_parse_mode(ParseMode::Plain), None);
        assert_eq!(tg_parse_mode(ParseMode::Html), Some(TgParseMode::Html));
        assert_eq!(
            tg_parse_mode(ParseMode::MarkdownV2),
            Some(TgParseMode::MarkdownV2)
        );
    }

    #[test]
    fn id_conversions() {
        assert_eq!(tg_chat(ChatId(-100)).0, -100);
        assert_eq!(tg_message(MessageId(7)).0, 7);
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(&config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
