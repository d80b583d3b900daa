// SPDX-FileCopyrightText: 2026 Shopbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the shop's tables.

pub mod broadcasts;
pub mod customers;
pub mod purchases;
