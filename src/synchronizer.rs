// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Synchronizer
//!
//! Rebuilds the local record set from the ledger. Read-only with respect to
//! ledger state.
//!
//! ## Strategy
//!
//! 1. List all record identifiers. Failure here fails the whole pass.
//! 2. Fetch each record individually. A failed fetch is logged and the
//!    record skipped; the pass still succeeds with the rest.
//! 3. Swap the new set in as one snapshot. Readers keep seeing the previous
//!    snapshot until the swap, never a half-built one.
//!
//! Passes are serialized, so the synchronizer is the single writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::ledger::{LedgerError, LedgerGateway};
use crate::models::RepoRecord;

/// Immutable view of the local record set.
pub type RecordSnapshot = Arc<Vec<RepoRecord>>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to list record identifiers: {0}")]
    ListIdentifiers(#[source] LedgerError),
}

/// Lowers the refreshing flag even when the pass is abandoned mid-flight.
struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct RecordSynchronizer {
    gateway: Arc<dyn LedgerGateway>,
    snapshot: RwLock<RecordSnapshot>,
    pass: tokio::sync::Mutex<()>,
    refreshing: AtomicBool,
}

impl RecordSynchronizer {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self {
            gateway,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            pass: tokio::sync::Mutex::new(()),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Current snapshot, in ledger listing order.
    pub fn records(&self) -> RecordSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn record(&self, id: &str) -> Option<RepoRecord> {
        self.records().iter().find(|r| r.id == id).cloned()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Run one synchronisation pass and publish its result.
    pub async fn refresh(&self) -> Result<RecordSnapshot, SyncError> {
        let _pass = self.pass.lock().await;
        let result = {
            let _flag = RefreshingFlag::raise(&self.refreshing);
            self.fetch_all().await
        };

        let records = Arc::new(result?);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&records);
        Ok(records)
    }

    async fn fetch_all(&self) -> Result<Vec<RepoRecord>, SyncError> {
        let ids = self
            .gateway
            .list_record_ids()
            .await
            .map_err(SyncError::ListIdentifiers)?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.gateway.get_record(&id).await {
                Ok(data) => records.push(RepoRecord::from_ledger(id, data)),
                Err(e) => {
                    warn!(record_id = %id, error = %e, "Failed to load record, skipping");
                }
            }
        }

        debug!(records = records.len(), "Record set synchronised");
        Ok(records)
    }
}
