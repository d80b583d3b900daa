// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-rate gate shared by every running campaign.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Hands out send permits no closer together than `1 / rate` seconds.
///
/// Each caller reserves the next free slot under the lock and sleeps outside
/// it, so concurrent campaigns interleave instead of bursting.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateGate {
    /// A gate admitting at most `per_second` permits per second. Zero is
    /// treated as one.
    pub fn per_second(per_second: u32) -> Self {
        let per_second = per_second.max(1);
        Self::with_interval(Duration::from_secs(1) / per_second)
    }

    /// A gate with an explicit minimum spacing between permits.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Minimum spacing between two permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next permit.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}
