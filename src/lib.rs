// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repo Ledger - Confidential Repository Registry Client
//!
//! Registers repository metadata on an EVM ledger while the repository size
//! stays encrypted on-chain until it is decrypted and verified.
//!
//! ## Modules
//!
//! - `ledger` - Ledger gateway contract and transaction types
//! - `confidential` - Confidential value service contract and HTTP relayer
//! - `blockchain` - alloy-backed ledger gateway
//! - `synchronizer` - Local record set kept in sync with the ledger
//! - `workflow` - Submission and decryption/verification workflows
//! - `status` - Single-slot transaction status notifier
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod blockchain;
pub mod client;
pub mod confidential;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod query;
pub mod session;
pub mod state;
pub mod status;
pub mod synchronizer;
pub mod workflow;

#[cfg(test)]
mod testing;
