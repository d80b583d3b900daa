// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end campaign tests against the mock channel and in-memory store.

use std::sync::Arc;
use std::time::Duration;

use shopbot_broadcast::{BroadcastEngine, DeliveryReport, Initiation, RateGate};
use shopbot_config::model::BroadcastConfig;
use shopbot_core::types::{
    BroadcastId, BroadcastStatus, ChatId, InboundMessage, MessageId, ParseMode, Sender, UserId,
};
use shopbot_core::{ShopError, StorageAdapter};
use shopbot_test_utils::{MemoryStorage, MockChannel};

const OPERATOR: i64 = 1;

fn command(from: i64, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(7),
        chat_id: ChatId(from),
        sender: Sender {
            id: UserId(from),
            username: Some("admin".into()),
            language_code: None,
        },
        text: Some(text.to_string()),
        has_photo: false,
        reply_to: None,
        timestamp: "2026-01-01T00:00:00Z".to_string(),
    }
}

struct Fixture {
    channel: Arc<MockChannel>,
    storage: Arc<MemoryStorage>,
    engine: BroadcastEngine,
}

async fn fixture(subscribers: &[i64], config: BroadcastConfig) -> Fixture {
    let channel = Arc::new(MockChannel::new());
    let storage = Arc::new(MemoryStorage::new());
    storage.add_subscribers(subscribers.iter().copied()).await;
    let engine = BroadcastEngine::new(
        channel.clone(),
        storage.clone(),
        UserId(OPERATOR),
        config,
    );
    Fixture {
        channel,
        storage,
        engine,
    }
}

async fn run(f: &Fixture, text: &str) -> (BroadcastId, DeliveryReport) {
    match f.engine.initiate(&command(OPERATOR, text)).await {
        Initiation::Started {
            campaign_id,
            handle,
            ..
        } => (campaign_id, handle.await.unwrap()),
        other => panic!("campaign did not start: {other:?}"),
    }
}

async fn status_of(storage: &MemoryStorage, id: BroadcastId) -> BroadcastStatus {
    storage.get_broadcast(id).await.unwrap().unwrap().status
}

#[tokio::test(start_paused = true)]
async fn pm_hello_reaches_every_subscriber() {
    let f = fixture(&[OPERATOR, 100, 200], BroadcastConfig::default()).await;
    let start = tokio::time::Instant::now();

    let (id, report) = run(&f, "/pm Hello").await;

    assert_eq!(
        report,
        DeliveryReport {
            success: 2,
            failed: 0,
            total: 2
        }
    );
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Sent);
    let record = f.storage.get_broadcast(id).await.unwrap().unwrap();
    assert_eq!(record.message, "Hello");
    assert_eq!(record.sender_id, UserId(OPERATOR));

    let sent = f.channel.sent().await;
    let to_100 = sent.iter().find(|r| r.message.chat_id == ChatId(100)).unwrap();
    let to_200 = sent.iter().find(|r| r.message.chat_id == ChatId(200)).unwrap();
    assert_eq!(to_100.message.text, "Hello");
    assert_eq!(to_100.message.parse_mode, ParseMode::Html);
    assert!(to_200.at - to_100.at >= Duration::from_millis(35));
    assert!(start.elapsed() >= Duration::from_millis(35));

    let operator_texts = f.channel.texts_to(ChatId(OPERATOR)).await;
    assert_eq!(operator_texts.len(), 2);
    assert_eq!(operator_texts[0], BroadcastConfig::default().ack_text);
    assert!(operator_texts[1].contains("Success: 2, Fail: 0, Total: 2"));
    assert!(f.channel.texts_to(ChatId(OPERATOR)).await.iter().all(|t| t != "Hello"));
}

#[tokio::test(start_paused = true)]
async fn every_recipient_failing_marks_campaign_failed() {
    let f = fixture(&[10, 11, 12], BroadcastConfig::default()).await;
    for chat in [10, 11, 12] {
        f.channel.fail_chat(ChatId(chat)).await;
    }

    let (id, report) = run(&f, "/pm down").await;

    assert_eq!((report.success, report.failed, report.total), (0, 3, 3));
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Failed);
    let summary = f.channel.texts_to(ChatId(OPERATOR)).await.pop().unwrap();
    assert!(summary.contains("Success: 0, Fail: 3, Total: 3"));
}

#[tokio::test(start_paused = true)]
async fn partial_failure_is_still_sent() {
    let f = fixture(&[10, 11, 12], BroadcastConfig::default()).await;
    f.channel.fail_chat(ChatId(11)).await;

    let (id, report) = run(&f, "/pm partial").await;

    assert_eq!((report.success, report.failed, report.total), (2, 1, 3));
    assert_eq!(report.success + report.failed, report.total);
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Sent);
    assert_eq!(f.channel.texts_to(ChatId(12)).await, vec!["partial".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn no_subscribers_ends_sent() {
    let f = fixture(&[OPERATOR], BroadcastConfig::default()).await;

    let (id, report) = run(&f, "/pm anyone?").await;

    assert_eq!(report, DeliveryReport::default());
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Sent);
    let summary = f.channel.texts_to(ChatId(OPERATOR)).await.pop().unwrap();
    assert!(summary.contains("Success: 0, Fail: 0, Total: 0"));
}

#[tokio::test(start_paused = true)]
async fn sends_are_spaced_by_the_delay() {
    let subscribers: Vec<i64> = (100..110).collect();
    let f = fixture(&subscribers, BroadcastConfig::default()).await;
    let start = tokio::time::Instant::now();

    let (_, report) = run(&f, "/pm paced").await;

    assert_eq!(report.total, 10);
    let times: Vec<_> = f
        .channel
        .sent()
        .await
        .into_iter()
        .filter(|r| r.message.chat_id != ChatId(OPERATOR))
        .map(|r| r.at)
        .collect();
    assert_eq!(times.len(), 10);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(35));
    }
    assert!(start.elapsed() >= Duration::from_millis(35 * 9));
}

#[tokio::test]
async fn empty_body_gets_usage_and_no_side_effects() {
    let f = fixture(&[10], BroadcastConfig::default()).await;

    let outcome = f.engine.initiate(&command(OPERATOR, "/pm   ")).await;

    assert!(matches!(outcome, Initiation::Usage));
    assert_eq!(
        f.channel.texts_to(ChatId(OPERATOR)).await,
        vec![BroadcastConfig::default().usage_text]
    );
    assert_eq!(f.channel.sent_count().await, 1);
    assert_eq!(f.storage.mutations(), 0);
}

#[tokio::test]
async fn non_operator_triggers_nothing() {
    let f = fixture(&[10, 20], BroadcastConfig::default()).await;

    let outcome = f.engine.initiate(&command(20, "/pm hi all")).await;

    assert!(matches!(outcome, Initiation::Unauthorized));
    assert_eq!(f.channel.call_count().await, 0);
    assert_eq!(f.storage.mutations(), 0);
}

#[tokio::test]
async fn other_text_is_not_a_command() {
    let f = fixture(&[10], BroadcastConfig::default()).await;
    let outcome = f.engine.initiate(&command(OPERATOR, "hello")).await;
    assert!(matches!(outcome, Initiation::NotCommand));
    assert_eq!(f.channel.call_count().await, 0);
}

#[tokio::test]
async fn record_failure_aborts_before_any_send() {
    let f = fixture(&[10, 20], BroadcastConfig::default()).await;
    f.storage.fail_create(true);

    let outcome = f.engine.initiate(&command(OPERATOR, "/pm hi")).await;

    assert!(matches!(outcome, Initiation::Aborted { campaign_id: None }));
    assert_eq!(
        f.channel.texts_to(ChatId(OPERATOR)).await,
        vec![BroadcastConfig::default().failure_text]
    );
    assert_eq!(f.channel.sent_count().await, 1);
    assert!(f.storage.broadcasts().await.is_empty());
}

#[tokio::test]
async fn recipient_failure_leaves_campaign_pending() {
    let f = fixture(&[10, 20], BroadcastConfig::default()).await;
    f.storage.fail_subscribers(true);

    let outcome = f.engine.initiate(&command(OPERATOR, "/pm hi")).await;

    let Initiation::Aborted {
        campaign_id: Some(id),
    } = outcome
    else {
        panic!("expected an aborted campaign, got {outcome:?}");
    };
    let config = BroadcastConfig::default();
    assert_eq!(
        f.channel.texts_to(ChatId(OPERATOR)).await,
        vec![config.ack_text, config.recipients_failure_text]
    );
    assert_eq!(f.storage.status_writes(), 0);
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn status_write_failure_still_reports() {
    let f = fixture(&[10, 20], BroadcastConfig::default()).await;
    f.storage.fail_status(true);

    let (id, report) = run(&f, "/pm hi").await;

    assert_eq!(report.success, 2);
    assert_eq!(f.storage.status_writes(), 1);
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Pending);
    let summary = f.channel.texts_to(ChatId(OPERATOR)).await.pop().unwrap();
    assert!(summary.contains("Total: 2"));
}

#[tokio::test(start_paused = true)]
async fn status_is_written_exactly_once() {
    let f = fixture(&[10], BroadcastConfig::default()).await;

    let (id, _) = run(&f, "/pm once").await;

    assert_eq!(f.storage.status_writes(), 1);
    let err = f
        .storage
        .update_broadcast_status(id, BroadcastStatus::Failed)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::InvalidTransition { .. }));
    assert_eq!(status_of(&f.storage, id).await, BroadcastStatus::Sent);
}

#[tokio::test(start_paused = true)]
async fn wait_idle_returns_after_campaigns_finish() {
    let f = fixture(&[10, 11, 12, 13], BroadcastConfig::default()).await;

    let first = f.engine.initiate(&command(OPERATOR, "/pm one")).await;
    let second = f.engine.initiate(&command(OPERATOR, "/pm two")).await;
    assert!(matches!(first, Initiation::Started { .. }));
    assert!(matches!(second, Initiation::Started { .. }));

    f.engine.wait_idle().await;

    assert_eq!(f.engine.running(), 0);
    for record in f.storage.broadcasts().await {
        assert_eq!(record.status, BroadcastStatus::Sent);
    }
    let summaries = f
        .channel
        .texts_to(ChatId(OPERATOR))
        .await
        .into_iter()
        .filter(|t| t.contains("Total: 4"))
        .count();
    assert_eq!(summaries, 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_campaigns_share_the_rate_gate() {
    let config = BroadcastConfig {
        send_delay_ms: 0,
        max_sends_per_second: 10,
        ..BroadcastConfig::default()
    };
    let channel = Arc::new(MockChannel::new());
    let storage = Arc::new(MemoryStorage::new());
    storage.add_subscribers([10, 11, 12]).await;
    let gate = Arc::new(RateGate::per_second(config.max_sends_per_second));
    let a = BroadcastEngine::with_gate(
        channel.clone(),
        storage.clone(),
        UserId(OPERATOR),
        config.clone(),
        gate.clone(),
    );
    let b = BroadcastEngine::with_gate(
        channel.clone(),
        storage.clone(),
        UserId(OPERATOR),
        config,
        gate,
    );

    let (Initiation::Started { handle: ha, .. }, Initiation::Started { handle: hb, .. }) = (
        a.initiate(&command(OPERATOR, "/pm from a")).await,
        b.initiate(&command(OPERATOR, "/pm from b")).await,
    ) else {
        panic!("campaigns did not start");
    };
    ha.await.unwrap();
    hb.await.unwrap();

    let mut times: Vec<_> = channel
        .sent()
        .await
        .into_iter()
        .filter(|r| r.message.chat_id != ChatId(OPERATOR))
        .map(|r| r.at)
        .collect();
    assert_eq!(times.len(), 6);
    times.sort();
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(100));
    }
}
