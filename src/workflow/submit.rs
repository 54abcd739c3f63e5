// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential submission workflow.
//!
//! 1. Generate a fresh identifier.
//! 2. Encrypt the size bound to (contract, account). Nothing touches the
//!    ledger if this fails.
//! 3. Submit the creation transaction.
//! 4. Await confirmation.
//! 5. Refresh the local record set.
//!
//! A failure at any step ends the workflow; a retry starts again from 1 with
//! a new identifier.

use chrono::Utc;
use tracing::{info, warn};

use crate::client::RegistryClient;
use crate::ledger::NewRecord;
use crate::models::NewRecordRequest;
use crate::session::Session;
use crate::status::{PendingStatus, TxPhase};

use super::error::{ClientError, SubmissionError};

/// Time-based record identifier. Collisions are not guarded against.
pub fn generate_record_id() -> String {
    format!("repo-{}", Utc::now().timestamp_millis())
}

/// Keep only the digits of a raw size and parse it.
pub fn sanitize_size(raw: &str) -> Result<u32, ClientError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ClientError::InvalidInput(
            "repository size is required".to_string(),
        ));
    }
    digits.parse::<u32>().map_err(|_| {
        ClientError::InvalidInput(format!("repository size exceeds {}", u32::MAX))
    })
}

/// A creation request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    pub name: String,
    pub description: String,
    pub size: u32,
    pub file_count: u64,
}

impl NewRecordRequest {
    pub fn validate(&self) -> Result<ValidatedRecord, ClientError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput(
                "repository name is required".to_string(),
            ));
        }
        let size = sanitize_size(&self.size)?;
        let files = self.files.trim();
        if files.is_empty() {
            return Err(ClientError::InvalidInput("file count is required".to_string()));
        }
        let file_count = files.parse::<u64>().map_err(|_| {
            ClientError::InvalidInput(format!("file count must be a non-negative integer: {files}"))
        })?;

        Ok(ValidatedRecord {
            name: name.to_string(),
            description: self.description.clone(),
            size,
            file_count,
        })
    }
}

impl RegistryClient {
    /// Register a new repository with a confidential size.
    ///
    /// Returns the identifier of the created record. The record starts
    /// unverified.
    pub async fn submit(&self, request: &NewRecordRequest) -> Result<String, ClientError> {
        let session = self.require_session()?;
        let record = request.validate().inspect_err(|e| {
            self.status.report(TxPhase::Error, e.to_string());
        })?;
        self.ensure_initialized(&session).await?;

        let mut progress = self
            .status
            .pending("Creating repository with FHE encryption...");

        let record_id = match self.run_submission(&session, record, &mut progress).await {
            Ok(record_id) => record_id,
            Err(e) => {
                warn!(error = %e, "Repository submission failed");
                self.status.report(TxPhase::Error, e.to_string());
                return Err(e.into());
            }
        };

        self.status
            .report(TxPhase::Success, "Repository created successfully!");
        // The record exists on-chain; a failed refresh is reported on its own.
        let _ = self.refresh().await;
        Ok(record_id)
    }

    async fn run_submission(
        &self,
        session: &Session,
        record: ValidatedRecord,
        progress: &mut PendingStatus,
    ) -> Result<String, SubmissionError> {
        let record_id = generate_record_id();
        let contract = self.gateway.contract_address();

        let encrypted = self
            .confidential
            .encrypt(contract, session.account(), record.size)
            .await?;

        let pending = self
            .gateway
            .create_record(NewRecord {
                id: record_id.clone(),
                name: record.name,
                ciphertext: encrypted.ciphertext,
                proof: encrypted.proof,
                file_count: record.file_count,
                description: record.description,
            })
            .await?;

        info!(record_id = %record_id, tx_hash = %pending.tx_hash(), "Record creation submitted");
        progress.update("Waiting for transaction confirmation...");

        let receipt = pending.wait().await?;
        info!(
            record_id = %record_id,
            block_number = receipt.block_number,
            "Record creation confirmed"
        );
        Ok(record_id)
    }
}
