// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event loop for shopbot.
//!
//! The [`EventLoop`] receives events from the channel adapter, classifies
//! each one with [`router::classify`], and handles it in its own task so a
//! slow handler never holds up the next update. On shutdown it stops
//! receiving, drains the handlers, waits for running broadcasts, and closes
//! storage.

pub mod router;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use shopbot_broadcast::BroadcastEngine;
use shopbot_config::model::ShopConfig;
use shopbot_core::types::{CustomerUpsert, InboundEvent, InboundMessage, OutboundMessage, UserId};
use shopbot_core::{ChannelAdapter, ShopError, StorageAdapter};
use shopbot_relay::{PhotoOutcome, RelayCoordinator, RelayStore, ReplyOutcome};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::router::Route;

/// Handles one inbound event. Cheap to clone into a task.
#[derive(Clone)]
pub struct EventHandler {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter>,
    broadcast: BroadcastEngine,
    relay: Arc<RelayCoordinator>,
    greeting: Arc<str>,
}

impl EventHandler {
    /// Wire the broadcast engine and relay coordinator from configuration.
    pub fn from_config(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        config: &ShopConfig,
    ) -> Self {
        let operator = UserId(config.telegram.operator_id);
        let broadcast = BroadcastEngine::new(
            channel.clone(),
            storage.clone(),
            operator,
            config.broadcast.clone(),
        );
        let store = Arc::new(RelayStore::with_thread_ttl(config.relay.thread_ttl()));
        let relay = Arc::new(RelayCoordinator::new(
            channel.clone(),
            storage.clone(),
            store,
            operator,
            config.relay.clone(),
        ));
        Self {
            channel,
            storage,
            broadcast,
            relay,
            greeting: Arc::from(config.bot.greeting.as_str()),
        }
    }

    pub fn broadcast(&self) -> &BroadcastEngine {
        &self.broadcast
    }

    pub fn relay(&self) -> &RelayCoordinator {
        &self.relay
    }

    /// Route an event to its component and run it to completion.
    ///
    /// Broadcast fan-out is detached; this returns once it has started.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<(), ShopError> {
        let route = router::classify(&event, self.broadcast.command());
        match (route, event) {
            (Route::Broadcast, InboundEvent::Message(msg)) => {
                let outcome = self.broadcast.initiate(&msg).await;
                debug!(?outcome, "broadcast command handled");
            }
            (Route::Start, InboundEvent::Message(msg)) => self.register(&msg).await?,
            (Route::Reply, InboundEvent::Message(msg)) => {
                let outcome = self.relay.on_admin_reply(&msg).await?;
                if outcome == ReplyOutcome::Ignored && msg.has_photo {
                    self.on_photo(&msg).await?;
                }
            }
            (Route::Photo, InboundEvent::Message(msg)) => self.on_photo(&msg).await?,
            (Route::Evidence(purchase), InboundEvent::Callback(cb)) => {
                self.relay
                    .begin_evidence_wait(cb.sender.id, purchase)
                    .await?;
            }
            (route, _) => debug!(?route, "event ignored"),
        }
        Ok(())
    }

    async fn on_photo(&self, msg: &InboundMessage) -> Result<(), ShopError> {
        if let PhotoOutcome::Forwarded { purchase_id, .. } =
            self.relay.on_photo_received(msg).await?
        {
            debug!(purchase_id = %purchase_id, "evidence handled");
        }
        Ok(())
    }

    async fn register(&self, msg: &InboundMessage) -> Result<(), ShopError> {
        self.storage
            .upsert_customer(&CustomerUpsert {
                telegram_id: msg.sender.id,
                language: msg.sender.language_code.clone(),
            })
            .await?;
        info!(user_id = %msg.sender.id, "subscriber registered");
        self.channel
            .send(OutboundMessage::plain(msg.chat_id, &*self.greeting))
            .await?;
        Ok(())
    }
}

/// Receives events until cancelled, one tracked task per event.
pub struct EventLoop {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter>,
    handler: EventHandler,
    tasks: TaskTracker,
    drain_timeout: Duration,
    prune_every: Option<Duration>,
}

impl EventLoop {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        config: &ShopConfig,
    ) -> Self {
        let handler = EventHandler::from_config(channel.clone(), storage.clone(), config);
        info!(
            bot_name = config.bot.name.as_str(),
            operator_id = config.telegram.operator_id,
            "event loop initialized"
        );
        Self {
            channel,
            storage,
            handler,
            tasks: TaskTracker::new(),
            drain_timeout: Duration::from_secs(30),
            prune_every: config.relay.thread_ttl().filter(|d| !d.is_zero()),
        }
    }

    /// Override how long shutdown waits for in-flight handlers.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }

    /// Runs until `cancel` fires or the channel closes, then shuts down in
    /// order: handlers, running broadcasts, storage.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ShopError> {
        info!("event loop running");
        let mut prune = self.prune_every.map(tokio::time::interval);

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => {
                            let handler = self.handler.clone();
                            self.tasks.spawn(async move {
                                if let Err(e) = handler.handle_event(event).await {
                                    error!(error = %e, "failed to handle inbound event");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = tick(&mut prune) => {
                    let removed = self.handler.relay().store().prune_expired();
                    if removed > 0 {
                        debug!(removed, "expired reply threads pruned");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping event loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&self.tasks, self.drain_timeout).await;

        let running = self.handler.broadcast().running();
        if running > 0 {
            info!(count = running, "waiting for running broadcasts");
        }
        self.handler.broadcast().wait_idle().await;

        self.storage.close().await?;
        info!("event loop stopped");
        Ok(())
    }
}

async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
