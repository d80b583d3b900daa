// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; nothing is collected unless the binary
//! installs a recorder.

use metrics::{describe_counter, describe_gauge};

/// Register broadcast metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "shopbot_broadcast_sends_total",
        "Broadcast delivery attempts by outcome"
    );
    describe_counter!(
        "shopbot_broadcast_campaigns_total",
        "Finished broadcast campaigns by final status"
    );
    describe_gauge!(
        "shopbot_broadcast_running",
        "Campaigns currently being delivered"
    );
}

pub(crate) fn record_send(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("shopbot_broadcast_sends_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_campaign(status: &str) {
    metrics::counter!("shopbot_broadcast_campaigns_total", "status" => status.to_string())
        .increment(1);
}

pub(crate) fn set_running(count: usize) {
    metrics::gauge!("shopbot_broadcast_running").set(count as f64);
}
