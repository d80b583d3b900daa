// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual-payment relay.
//!
//! A buyer presses "send payment screenshot", the bot waits for their photo,
//! copies it to the operator with the purchase details, and later relays the
//! operator's reply back to the buyer.

pub mod coordinator;
pub mod store;

pub use coordinator::{
    EVIDENCE_CALLBACK_PREFIX, PhotoOutcome, RelayCoordinator, ReplyOutcome, evidence_caption,
    parse_evidence_callback,
};
pub use store::RelayStore;
