// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decryption and verification workflow.
//!
//! 1. Fetch the record. If it is already verified, return the stored value
//!    without issuing any decryption request.
//! 2. Fetch the ciphertext handle of the confidential size.
//! 3. Request verified decryption of `[handle]`, supplying the continuation
//!    that submits the verification transaction.
//! 4. Extract the cleartext for the handle from the result.
//! 5. Refresh the local record set.
//!
//! An "already verified" failure anywhere means someone else won the race:
//! the workflow refreshes and returns `None` instead of an error. Because
//! step 1 runs again on every call, re-invoking after a failure is safe.

use std::sync::Arc;

use alloy::primitives::Bytes;
use futures::FutureExt;
use tracing::{info, warn};

use crate::client::RegistryClient;
use crate::confidential::ProofReadyFn;
use crate::ledger::LedgerGateway;
use crate::status::TxPhase;

use super::error::{ClientError, VerificationError};

impl RegistryClient {
    /// Reveal the confidential size of a record.
    ///
    /// Returns the verified size, or `None` when another party verified it
    /// while this call was in flight.
    pub async fn reveal_size(&self, record_id: &str) -> Result<Option<u32>, ClientError> {
        let session = self.require_session()?;

        let record = match self.gateway.get_record(record_id).await {
            Ok(record) => record,
            Err(e) => return self.finish_reveal(record_id, Err(e.into())).await,
        };
        if record.is_verified {
            info!(record_id = %record_id, "Size already verified, skipping decryption");
            self.status
                .report(TxPhase::Success, "Data already verified on-chain");
            return Ok(Some(record.revealed_value));
        }

        self.ensure_initialized(&session).await?;
        let _progress = self.status.pending("Verifying decryption on-chain...");
        let outcome = self.run_verification(record_id).await;
        self.finish_reveal(record_id, outcome).await
    }

    async fn run_verification(&self, record_id: &str) -> Result<u32, VerificationError> {
        let handle = self.gateway.get_encrypted_handle(record_id).await?;
        let on_proof_ready = verification_submitter(Arc::clone(&self.gateway), record_id);

        let decryption = self
            .confidential
            .verify_decryption(vec![handle], self.gateway.contract_address(), on_proof_ready)
            .await?;

        let clear = decryption.clear_value(&handle)?;
        let value = u32::try_from(clear).map_err(|e| {
            VerificationError::Failed(format!("clear value out of range: {e}"))
        })?;

        info!(
            record_id = %record_id,
            tx_hash = %decryption.receipt.tx_hash,
            "Decryption verified on-chain"
        );
        Ok(value)
    }

    async fn finish_reveal(
        &self,
        record_id: &str,
        outcome: Result<u32, VerificationError>,
    ) -> Result<Option<u32>, ClientError> {
        match outcome {
            Ok(value) => {
                self.status
                    .report(TxPhase::Success, "Data decrypted and verified successfully!");
                // A failed refresh supersedes the success with its own status.
                let _ = self.refresh().await;
                Ok(Some(value))
            }
            Err(VerificationError::AlreadyVerified) => {
                info!(record_id = %record_id, "Size was verified concurrently");
                self.status
                    .report(TxPhase::Success, "Data is already verified on-chain");
                let _ = self.refresh().await;
                Ok(None)
            }
            Err(e) => {
                warn!(record_id = %record_id, error = %e, "Size reveal failed");
                self.status.report(TxPhase::Error, e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Continuation that submits `(record_id, clear_values, proof)` and awaits
/// the verification transaction.
fn verification_submitter(gateway: Arc<dyn LedgerGateway>, record_id: &str) -> ProofReadyFn {
    let record_id = record_id.to_string();
    Box::new(move |clear_values: Bytes, proof: Bytes| {
        async move {
            let pending = gateway
                .submit_verification(&record_id, clear_values, proof)
                .await?;
            pending.wait().await
        }
        .boxed()
    })
}
