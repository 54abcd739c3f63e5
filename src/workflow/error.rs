// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Workflow error taxonomy.
//!
//! The `Display` text of each error is the message shown through the
//! transaction status notifier.

use crate::confidential::ConfidentialError;
use crate::ledger::{mentions_already_verified, LedgerError};
use crate::synchronizer::SyncError;

/// Record creation failure. The caller restarts from a fresh identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Submission failed: {0}")]
    Failed(String),
}

impl From<LedgerError> for SubmissionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserRejected(_) => SubmissionError::UserRejected,
            other => SubmissionError::Failed(other.to_string()),
        }
    }
}

impl From<ConfidentialError> for SubmissionError {
    fn from(err: ConfidentialError) -> Self {
        match err {
            ConfidentialError::ProofSubmission(ledger) => ledger.into(),
            other => SubmissionError::Failed(other.to_string()),
        }
    }
}

/// Decryption or on-chain verification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// Another party verified the field first. Treated as soft success.
    #[error("Data already verified")]
    AlreadyVerified,

    #[error("Decryption failed: Record not found: {0}")]
    RecordNotFound(String),

    #[error("Decryption failed: {0}")]
    Failed(String),
}

impl From<LedgerError> for VerificationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyVerified(_) => VerificationError::AlreadyVerified,
            LedgerError::RecordNotFound(id) => VerificationError::RecordNotFound(id),
            other if mentions_already_verified(&other.to_string()) => {
                VerificationError::AlreadyVerified
            }
            other => VerificationError::Failed(other.to_string()),
        }
    }
}

impl From<ConfidentialError> for VerificationError {
    fn from(err: ConfidentialError) -> Self {
        if err.is_already_verified() {
            VerificationError::AlreadyVerified
        } else {
            VerificationError::Failed(err.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Please connect wallet first")]
    ConnectionRequired,

    #[error("Confidential subsystem initialization failed: {0}")]
    InitializationFailure(#[source] ConfidentialError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
