// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign lifecycle: record, resolve recipients, paced fan-out, rollup.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use shopbot_config::model::BroadcastConfig;
use shopbot_core::types::{
    BroadcastId, BroadcastStatus, InboundMessage, MessageId, NewBroadcast, OutboundMessage,
    ParseMode, UserId,
};
use shopbot_core::{ChannelAdapter, ShopError, StorageAdapter};

use crate::metrics;
use crate::rate_gate::RateGate;

/// Aggregated outcome of one campaign's send loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl DeliveryReport {
    /// Terminal status implied by the counters.
    pub fn status(&self) -> BroadcastStatus {
        BroadcastStatus::rollup(self.total, self.failed)
    }

    /// Operator-facing plain-text summary.
    pub fn summary(&self) -> String {
        format!(
            "Broadcast finished.\nSuccess: {}, Fail: {}, Total: {}",
            self.success, self.failed, self.total
        )
    }
}

/// What [`BroadcastEngine::initiate`] did with a message.
#[derive(Debug)]
pub enum Initiation {
    /// The text does not start with the broadcast command.
    NotCommand,
    /// Sender is not the operator. Nothing was sent or stored.
    Unauthorized,
    /// Empty body; the operator got the usage notice.
    Usage,
    /// The campaign could not start. `campaign_id` is set when the record
    /// had already been created.
    Aborted { campaign_id: Option<BroadcastId> },
    /// Fan-out is running in a tracked task.
    Started {
        campaign_id: BroadcastId,
        recipients: usize,
        handle: JoinHandle<DeliveryReport>,
    },
}

/// Extract the broadcast body from `text` if it starts with `command`.
///
/// Accepts the `/cmd@botname` form. Returns `None` when the text is not this
/// command and `Some("")` when the command carries no body.
pub fn parse_command_body<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let rest = text.trim_start().strip_prefix(command)?;
    let rest = match rest.strip_prefix('@') {
        Some(mention) => mention
            .find(char::is_whitespace)
            .map_or("", |idx| &mention[idx..]),
        None => rest,
    };
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Owns the broadcast lifecycle for one operator.
///
/// Cheap to clone; clones share the rate gate and the task tracker.
#[derive(Clone)]
pub struct BroadcastEngine {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter>,
    operator: UserId,
    config: BroadcastConfig,
    gate: Arc<RateGate>,
    tasks: TaskTracker,
}

impl BroadcastEngine {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        operator: UserId,
        config: BroadcastConfig,
    ) -> Self {
        let gate = Arc::new(RateGate::per_second(config.max_sends_per_second));
        Self::with_gate(channel, storage, operator, config, gate)
    }

    /// Build an engine that draws send permits from an existing gate.
    pub fn with_gate(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        operator: UserId,
        config: BroadcastConfig,
        gate: Arc<RateGate>,
    ) -> Self {
        Self {
            channel,
            storage,
            operator,
            config,
            gate,
            tasks: TaskTracker::new(),
        }
    }

    pub fn operator(&self) -> UserId {
        self.operator
    }

    /// The broadcast command prefix, e.g. `/pm`.
    pub fn command(&self) -> &str {
        &self.config.command
    }

    /// Number of campaigns still delivering.
    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    /// Start a campaign from an operator command.
    ///
    /// Returns once the fan-out task has been spawned; it never waits for
    /// delivery.
    pub async fn initiate(&self, msg: &InboundMessage) -> Initiation {
        let sender = msg.sender.id;
        let Some(body) = msg
            .text
            .as_deref()
            .and_then(|t| parse_command_body(t, &self.config.command))
        else {
            return Initiation::NotCommand;
        };

        if sender != self.operator {
            info!(user_id = %sender, "unauthorized broadcast attempt");
            return Initiation::Unauthorized;
        }

        if body.is_empty() {
            self.notify_operator(&self.config.usage_text).await;
            return Initiation::Usage;
        }

        let record = match self
            .storage
            .create_broadcast(&NewBroadcast {
                sender_id: sender,
                message: body.to_string(),
            })
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "failed to create broadcast record");
                self.notify_operator(&self.config.failure_text).await;
                return Initiation::Aborted { campaign_id: None };
            }
        };
        let campaign_id = record.id;
        info!(campaign_id = %campaign_id, sent_at = %record.sent_at, "broadcast created");

        let ack = self.notify_operator(&self.config.ack_text).await;

        let recipients = match self.resolve_recipients().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(campaign_id = %campaign_id, error = %e, "failed to load subscribers");
                // No fan-out ran, so the campaign stays pending.
                self.notify_operator(&self.config.recipients_failure_text)
                    .await;
                return Initiation::Aborted {
                    campaign_id: Some(campaign_id),
                };
            }
        };

        let count = recipients.len();
        info!(campaign_id = %campaign_id, recipients = count, "broadcast fan-out starting");

        let engine = self.clone();
        let body = body.to_string();
        let handle = self.tasks.spawn(async move {
            metrics::set_running(engine.tasks.len());
            let report = engine.dispatch(campaign_id, &body, &recipients, ack).await;
            metrics::set_running(engine.tasks.len().saturating_sub(1));
            report
        });

        Initiation::Started {
            campaign_id,
            recipients: count,
            handle,
        }
    }

    /// Every subscriber except the operator, in store order.
    pub async fn resolve_recipients(&self) -> Result<Vec<UserId>, ShopError> {
        self.storage.list_subscriber_ids(self.operator).await
    }

    /// Deliver `body` to each recipient in turn, then persist and report.
    ///
    /// Sends are strictly sequential with `send_delay` between adjacent
    /// attempts; each attempt also takes one permit from the shared gate.
    pub async fn dispatch(
        &self,
        campaign_id: BroadcastId,
        body: &str,
        recipients: &[UserId],
        ack: Option<MessageId>,
    ) -> DeliveryReport {
        let delay = self.config.send_delay();
        let mut report = DeliveryReport {
            total: recipients.len(),
            ..DeliveryReport::default()
        };

        for (idx, user) in recipients.iter().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.gate.acquire().await;

            match self.channel.send(OutboundMessage::html(*user, body)).await {
                Ok(_) => {
                    report.success += 1;
                    metrics::record_send(true);
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::record_send(false);
                    warn!(campaign_id = %campaign_id, user_id = %user, error = %e, "broadcast send failed");
                }
            }

            self.report_progress(ack, idx + 1, report.total).await;
        }

        let status = report.status();
        self.persist_status(campaign_id, status).await;
        metrics::record_campaign(&status.to_string());
        info!(
            campaign_id = %campaign_id,
            success = report.success,
            failed = report.failed,
            total = report.total,
            status = %status,
            "broadcast finished"
        );

        self.notify_operator(&report.summary()).await;
        report
    }

    /// Wait until every campaign spawned so far has finished.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    async fn report_progress(&self, ack: Option<MessageId>, done: usize, total: usize) {
        let interval = self.config.progress_interval;
        let Some(ack) = ack else { return };
        if interval == 0 || done % interval != 0 || done == total {
            return;
        }
        let text = format!("Sent {done}/{total}");
        if let Err(e) = self
            .channel
            .edit_text(self.operator.into(), ack, &text, ParseMode::Plain)
            .await
        {
            debug!(error = %e, "progress update failed");
        }
    }

    async fn persist_status(&self, campaign_id: BroadcastId, status: BroadcastStatus) {
        if let Err(e) = self
            .storage
            .update_broadcast_status(campaign_id, status)
            .await
        {
            error!(campaign_id = %campaign_id, status = %status, error = %e, "failed to update broadcast status");
        }
    }

    async fn notify_operator(&self, text: &str) -> Option<MessageId> {
        match self
            .channel
            .send(OutboundMessage::plain(self.operator, text))
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "failed to notify operator");
                None
            }
        }
    }
}
