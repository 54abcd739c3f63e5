// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for the repository registry contract.
//!
//! - `registry`: contract ABI bindings
//! - `client`: [`LedgerClient`], the alloy-backed ledger gateway
//! - `signing`: account key loading
//! - `types`: network presets

pub mod client;
pub mod registry;
pub mod signing;
pub mod types;

pub use client::LedgerClient;
pub use types::*;
