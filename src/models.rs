// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Repository records as held in the local record set, plus the request and
//! response bodies of the HTTP API. All API types derive `Serialize`,
//! `Deserialize` and `ToSchema`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::LedgerRecord;

// =============================================================================
// Repository Record
// =============================================================================

/// One registered repository.
///
/// `revealed_size` is `Some` only when `size_verified` is true: a value that
/// has not been committed on-chain is never part of a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RepoRecord {
    /// Identifier assigned by the submitting client (`repo-<millis>`).
    pub id: String,
    pub name: String,
    pub description: String,
    /// Public file count.
    pub file_count: u64,
    /// Creation or last update time, seconds since the unix epoch.
    pub updated_at: u64,
    /// Account that submitted the record.
    pub creator: String,
    /// Whether the confidential size has been decrypted and verified on-chain.
    pub size_verified: bool,
    /// Verified repository size (KB).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_size: Option<u32>,
}

impl RepoRecord {
    pub fn from_ledger(id: impl Into<String>, data: LedgerRecord) -> Self {
        Self {
            id: id.into(),
            name: data.name,
            description: data.description,
            file_count: data.file_count,
            updated_at: data.timestamp,
            creator: data.creator.to_string(),
            size_verified: data.is_verified,
            revealed_size: data.is_verified.then_some(data.revealed_value),
        }
    }
}

// =============================================================================
// Record Queries
// =============================================================================

/// One page of records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecordPage {
    pub records: Vec<RepoRecord>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Number of records matching the search.
    pub total_records: usize,
}

/// Aggregate statistics over the local record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecordStats {
    pub total_records: usize,
    pub total_files: u64,
    /// Average files per record, rounded.
    pub avg_files: u64,
    /// Number of distinct creators.
    pub active_creators: usize,
}

/// Response for the record listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    pub page: RecordPage,
    pub stats: RecordStats,
    /// Whether a synchronisation pass is currently running.
    pub refreshing: bool,
}

// =============================================================================
// Workflow Requests
// =============================================================================

/// Request to register a new repository.
///
/// Numeric fields arrive as raw form strings; `size` is sanitized to digits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NewRecordRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Repository size in KB (kept confidential).
    pub size: String,
    /// Public file count.
    pub files: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateRecordResponse {
    pub record_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RevealResponse {
    pub record_id: String,
    /// `null` when the value was verified by another party meanwhile.
    pub revealed_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RefreshResponse {
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AvailabilityResponse {
    pub available: bool,
}
