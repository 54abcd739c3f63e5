// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Confidential Value Service
//!
//! Encryption of plaintext integers bound to a (contract, account) pair and
//! verified decryption of ciphertext handles. The scheme itself is opaque to
//! this crate; [`relayer::RelayerClient`] talks to an HTTP relayer.
//!
//! Decryption is a two-phase continuation: the caller hands the service a
//! [`ProofReadyFn`] which submits the on-chain verification once the service
//! has produced the cleartext bundle and its proof. The service decides when
//! to invoke it and awaits its receipt before returning.

pub mod relayer;

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::ledger::{mentions_already_verified, CiphertextHandle, LedgerError, TxReceipt};

pub use relayer::RelayerClient;

/// Ciphertext plus the input proof accepted by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub ciphertext: CiphertextHandle,
    pub proof: Bytes,
}

/// Continuation invoked with `(abi_encoded_clear_values, decryption_proof)`.
pub type ProofReadyFn =
    Box<dyn FnOnce(Bytes, Bytes) -> BoxFuture<'static, Result<TxReceipt, LedgerError>> + Send>;

/// Result of a verified decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDecryption {
    /// Cleartext values keyed by the handle they were decrypted from.
    pub clear_values: HashMap<CiphertextHandle, U256>,
    /// Receipt of the verification transaction submitted by the continuation.
    pub receipt: TxReceipt,
}

impl VerifiedDecryption {
    pub fn clear_value(&self, handle: &CiphertextHandle) -> Result<U256, ConfidentialError> {
        self.clear_values
            .get(handle)
            .copied()
            .ok_or(ConfidentialError::MissingClearValue(*handle))
    }
}

#[async_trait]
pub trait ConfidentialValueService: Send + Sync {
    /// One-time setup. Idempotent after the first success.
    async fn initialize(&self) -> Result<(), ConfidentialError>;

    fn is_initialized(&self) -> bool;

    async fn encrypt(
        &self,
        contract: Address,
        account: Address,
        plaintext: u32,
    ) -> Result<EncryptedInput, ConfidentialError>;

    async fn verify_decryption(
        &self,
        handles: Vec<CiphertextHandle>,
        contract: Address,
        on_proof_ready: ProofReadyFn,
    ) -> Result<VerifiedDecryption, ConfidentialError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfidentialError {
    #[error("Confidential service is not initialized")]
    NotInitialized,

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("No clear value returned for handle {0}")]
    MissingClearValue(CiphertextHandle),

    #[error(transparent)]
    ProofSubmission(#[from] LedgerError),

    #[error("Relayer transport error: {0}")]
    Transport(String),
}

impl ConfidentialError {
    /// Whether this failure means the field was verified by someone else.
    pub fn is_already_verified(&self) -> bool {
        match self {
            ConfidentialError::ProofSubmission(LedgerError::AlreadyVerified(_)) => true,
            other => mentions_already_verified(&other.to_string()),
        }
    }
}
