// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast fan-out for shopbot.
//!
//! The operator's broadcast command creates a `pending` campaign, snapshots
//! the subscriber list, and hands delivery to a tracked background task that
//! sends to each recipient in turn. The campaign ends `sent` unless every
//! attempt failed, and the operator receives a summary either way.

pub mod engine;
pub mod metrics;
pub mod rate_gate;

pub use engine::{BroadcastEngine, DeliveryReport, Initiation, parse_command_body};
pub use rate_gate::RateGate;
