// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Buyer → operator → buyer relay for manual wallet payments.

use std::sync::Arc;

use tracing::{debug, info, warn};

use shopbot_config::model::RelayConfig;
use shopbot_core::types::{
    CopyRequest, InboundMessage, MessageId, OutboundMessage, Purchase, PurchaseId, Sender, UserId,
};
use shopbot_core::{ChannelAdapter, ShopError, StorageAdapter};

use crate::store::RelayStore;

/// Callback-data prefix of the "send payment screenshot" button.
pub const EVIDENCE_CALLBACK_PREFIX: &str = "send_ss_";

/// Purchase id carried by a `send_ss_<id>` callback.
pub fn parse_evidence_callback(data: &str) -> Option<PurchaseId> {
    data.strip_prefix(EVIDENCE_CALLBACK_PREFIX)?
        .parse::<i64>()
        .ok()
        .map(PurchaseId)
}

/// Caption attached to evidence copied into the operator's chat.
pub fn evidence_caption(
    purchase_id: PurchaseId,
    purchase: Option<&Purchase>,
    sender: &Sender,
) -> String {
    let mut caption = String::from("USDT wallet payment");
    if let Some(p) = purchase {
        caption.push_str(&format!("\nTariff: {} months", p.month));
    }
    caption.push_str(&format!("\nPurchase ID: {purchase_id}\nUser: {}", sender.id));
    if let Some(username) = sender.username.as_deref().filter(|u| !u.is_empty()) {
        caption.push_str(&format!(" (@{username})"));
    }
    caption
}

/// Result of [`RelayCoordinator::on_photo_received`].
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoOutcome {
    /// No evidence was expected from this user.
    NotAwaited,
    /// Evidence was copied to the operator as `forwarded`.
    Forwarded {
        purchase_id: PurchaseId,
        forwarded: MessageId,
    },
}

/// Result of [`RelayCoordinator::on_admin_reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Not the operator, or not a reply to a forwarded evidence message.
    Ignored,
    /// The reply reached `user`.
    Relayed { user: UserId },
}

pub struct RelayCoordinator {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter>,
    store: Arc<RelayStore>,
    operator: UserId,
    config: RelayConfig,
}

impl RelayCoordinator {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        store: Arc<RelayStore>,
        operator: UserId,
        config: RelayConfig,
    ) -> Self {
        Self {
            channel,
            storage,
            store,
            operator,
            config,
        }
    }

    pub fn store(&self) -> &Arc<RelayStore> {
        &self.store
    }

    /// Expect a photo from `user` proving payment of `purchase`, and ask for it.
    ///
    /// Any earlier wait for the same user is replaced.
    pub async fn begin_evidence_wait(
        &self,
        user: UserId,
        purchase: PurchaseId,
    ) -> Result<(), ShopError> {
        if let Some(previous) = self.store.begin_wait(user, purchase) {
            debug!(user_id = %user, previous = %previous, purchase_id = %purchase, "evidence wait replaced");
        }
        info!(user_id = %user, purchase_id = %purchase, "awaiting payment evidence");
        self.channel
            .send(OutboundMessage::plain(user, &self.config.evidence_prompt))
            .await?;
        Ok(())
    }

    /// Forward a buyer's photo to the operator if one was expected.
    ///
    /// On a failed copy nothing is recorded and the wait is put back, unless
    /// the buyer started a newer one meanwhile.
    pub async fn on_photo_received(&self, msg: &InboundMessage) -> Result<PhotoOutcome, ShopError> {
        if !msg.has_photo {
            return Ok(PhotoOutcome::NotAwaited);
        }
        let user = msg.sender.id;
        let Some(purchase_id) = self.store.take_wait(user) else {
            debug!(user_id = %user, "unsolicited photo ignored");
            return Ok(PhotoOutcome::NotAwaited);
        };

        let purchase = match self.storage.find_purchase_by_id(purchase_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(purchase_id = %purchase_id, error = %e, "purchase lookup failed");
                None
            }
        };

        let request = CopyRequest {
            from_chat: msg.chat_id,
            message_id: msg.id,
            to_chat: self.operator.into(),
            caption: Some(evidence_caption(purchase_id, purchase.as_ref(), &msg.sender)),
        };
        let forwarded = match self.channel.copy_message(request).await {
            Ok(id) => id,
            Err(e) => {
                let restored = self.store.restore_wait(user, purchase_id);
                warn!(user_id = %user, purchase_id = %purchase_id, restored, error = %e, "failed to forward payment evidence");
                return Err(e);
            }
        };

        self.store.record_thread(forwarded, user);
        info!(user_id = %user, purchase_id = %purchase_id, forwarded = %forwarded, "payment evidence forwarded");

        if let Err(e) = self
            .channel
            .send(OutboundMessage::plain(user, &self.config.review_ack))
            .await
        {
            warn!(user_id = %user, error = %e, "failed to acknowledge evidence");
        }

        Ok(PhotoOutcome::Forwarded {
            purchase_id,
            forwarded,
        })
    }

    /// Relay the operator's reply to the buyer behind the replied-to message.
    ///
    /// Text is sent as-is; a photo is copied with its caption. The thread
    /// entry is kept so the operator can reply again.
    pub async fn on_admin_reply(&self, msg: &InboundMessage) -> Result<ReplyOutcome, ShopError> {
        if msg.sender.id != self.operator {
            return Ok(ReplyOutcome::Ignored);
        }
        let Some(replied_to) = msg.reply_to else {
            return Ok(ReplyOutcome::Ignored);
        };
        let Some(user) = self.store.thread_user(replied_to) else {
            debug!(reply_to = %replied_to, "reply to unknown thread ignored");
            return Ok(ReplyOutcome::Ignored);
        };

        if msg.has_photo {
            self.channel
                .copy_message(CopyRequest {
                    from_chat: msg.chat_id,
                    message_id: msg.id,
                    to_chat: user.into(),
                    caption: None,
                })
                .await?;
        } else if let Some(text) = msg.text.as_deref().filter(|t| !t.is_empty()) {
            self.channel.send(OutboundMessage::plain(user, text)).await?;
        }
        info!(user_id = %user, reply_to = %replied_to, "operator reply relayed");

        if let Err(e) = self
            .channel
            .send(OutboundMessage::plain(msg.chat_id, &self.config.delivered_ack))
            .await
        {
            warn!(error = %e, "failed to confirm relay to operator");
        }
        Ok(ReplyOutcome::Relayed { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(username: Option<&str>) -> Sender {
        Sender {
            id: UserId(42),
            username: username.map(str::to_string),
            language_code: None,
        }
    }

    fn purchase(month: i32) -> Purchase {
        Purchase {
            id: PurchaseId(9),
            customer_id: 1,
            amount: 500,
            month,
            invoice_type: "crypto".into(),
            status: "new".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn callback_data_parsing() {
        assert_eq!(parse_evidence_callback("send_ss_17"), Some(PurchaseId(17)));
        assert_eq!(parse_evidence_callback("send_ss_"), None);
        assert_eq!(parse_evidence_callback("send_ss_x1"), None);
        assert_eq!(parse_evidence_callback("buy_17"), None);
    }

    #[test]
    fn caption_with_tariff_and_handle() {
        let caption = evidence_caption(PurchaseId(9), Some(&purchase(3)), &sender(Some("bob")));
        assert_eq!(
            caption,
            "USDT wallet payment\nTariff: 3 months\nPurchase ID: 9\nUser: 42 (@bob)"
        );
    }

    #[test]
    fn caption_without_purchase_or_handle() {
        let caption = evidence_caption(PurchaseId(9), None, &sender(None));
        assert_eq!(caption, "USDT wallet payment\nPurchase ID: 9\nUser: 42");
    }
}
