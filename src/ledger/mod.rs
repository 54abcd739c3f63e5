// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Gateway
//!
//! The async RPC boundary to the remote record contract. The core only sees
//! this trait; [`crate::blockchain::LedgerClient`] is the EVM implementation.
//!
//! Every mutating call hands back a [`PendingTx`] which must be awaited
//! (block inclusion) before the calling workflow moves on.

use std::fmt;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Opaque reference to a ciphertext stored on the ledger.
pub type CiphertextHandle = B256;

/// Substring the ledger and wallets use when a signature request is declined.
pub const USER_REJECTED_MARKER: &str = "user rejected";

/// Substring of the contract revert raised when a field is verified twice.
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// Check whether a raw failure message reports an already-verified field.
pub fn mentions_already_verified(message: &str) -> bool {
    message.to_ascii_lowercase().contains(ALREADY_VERIFIED_MARKER)
}

/// Check whether a raw failure message reports a declined signature.
pub fn mentions_user_rejection(message: &str) -> bool {
    message.to_ascii_lowercase().contains(USER_REJECTED_MARKER)
}

/// Record data as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub name: String,
    pub description: String,
    /// Seconds since the unix epoch.
    pub timestamp: u64,
    pub creator: Address,
    pub file_count: u64,
    pub is_verified: bool,
    /// Only meaningful when `is_verified` is true.
    pub revealed_value: u32,
}

/// Arguments of a record creation transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub id: String,
    pub name: String,
    pub ciphertext: CiphertextHandle,
    pub proof: Bytes,
    pub file_count: u64,
    pub description: String,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash (0x prefixed)
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}

/// A submitted transaction awaiting block inclusion.
pub struct PendingTx {
    tx_hash: String,
    confirmation: BoxFuture<'static, Result<TxReceipt, LedgerError>>,
}

impl PendingTx {
    pub fn new(
        tx_hash: impl Into<String>,
        confirmation: BoxFuture<'static, Result<TxReceipt, LedgerError>>,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            confirmation,
        }
    }

    /// A transaction whose receipt is already known.
    pub fn confirmed(receipt: TxReceipt) -> Self {
        let tx_hash = receipt.tx_hash.clone();
        Self::new(tx_hash, Box::pin(async move { Ok(receipt) }))
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Wait for block inclusion. A reverted receipt is an error.
    ///
    /// There is no timeout here; callers that stop waiting do not cancel
    /// the transaction itself.
    pub async fn wait(self) -> Result<TxReceipt, LedgerError> {
        let receipt = self.confirmation.await?;
        if !receipt.success {
            return Err(LedgerError::TransactionFailed(format!(
                "transaction {} reverted",
                receipt.tx_hash
            )));
        }
        Ok(receipt)
    }
}

impl fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTx")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// Contract surface consumed by the workflows and the synchronizer.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Address of the record contract. Ciphertexts are bound to it.
    fn contract_address(&self) -> Address;

    async fn list_record_ids(&self) -> Result<Vec<String>, LedgerError>;

    async fn get_record(&self, id: &str) -> Result<LedgerRecord, LedgerError>;

    async fn get_encrypted_handle(&self, id: &str) -> Result<CiphertextHandle, LedgerError>;

    /// Submit a new record. The reserved public value is always zero.
    async fn create_record(&self, record: NewRecord) -> Result<PendingTx, LedgerError>;

    async fn submit_verification(
        &self,
        id: &str,
        clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTx, LedgerError>;

    async fn probe_availability(&self) -> Result<bool, LedgerError>;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("No signing account configured")]
    SignerUnavailable,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("User rejected transaction: {0}")]
    UserRejected(String),

    #[error("{0}")]
    AlreadyVerified(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

impl LedgerError {
    /// Classify a raw RPC or contract message, falling back to `kind`.
    pub fn classify(message: impl Into<String>, kind: fn(String) -> LedgerError) -> Self {
        let message = message.into();
        if mentions_user_rejection(&message) {
            LedgerError::UserRejected(message)
        } else if mentions_already_verified(&message) {
            LedgerError::AlreadyVerified(message)
        } else {
            kind(message)
        }
    }
}
