// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry client facade.
//!
//! Owns the ledger gateway, the confidential value service, the record
//! synchronizer, the status notifier and the active account session. The
//! workflows in [`crate::workflow`] are implemented on this type.

use std::sync::{Arc, PoisonError, RwLock};

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::confidential::ConfidentialValueService;
use crate::ledger::LedgerGateway;
use crate::query::short_address;
use crate::session::Session;
use crate::status::{TxPhase, TxStatus, TxStatusNotifier};
use crate::synchronizer::{RecordSnapshot, RecordSynchronizer};
use crate::workflow::ClientError;

pub struct RegistryClient {
    pub(crate) gateway: Arc<dyn LedgerGateway>,
    pub(crate) confidential: Arc<dyn ConfidentialValueService>,
    pub(crate) synchronizer: RecordSynchronizer,
    pub(crate) status: TxStatusNotifier,
    session: RwLock<Option<Arc<Session>>>,
}

impl RegistryClient {
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        confidential: Arc<dyn ConfidentialValueService>,
        status: TxStatusNotifier,
    ) -> Self {
        Self {
            synchronizer: RecordSynchronizer::new(Arc::clone(&gateway)),
            gateway,
            confidential,
            status,
            session: RwLock::new(None),
        }
    }

    /// Start a fresh session for `account`. Initialization is redone.
    pub fn connect(&self, account: Address) {
        info!(account = %short_address(&account.to_string()), "Account connected");
        *self.session.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(Session::new(account)));
    }

    pub fn disconnect(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn account(&self) -> Option<Address> {
        self.session().map(|s| s.account())
    }

    pub fn is_connected(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.session().is_some_and(|s| s.is_initialized())
    }

    /// Address ciphertexts are bound to.
    pub fn contract_address(&self) -> Address {
        self.gateway.contract_address()
    }

    pub fn status(&self) -> &TxStatusNotifier {
        &self.status
    }

    pub fn current_status(&self) -> TxStatus {
        self.status.current()
    }

    pub fn records(&self) -> RecordSnapshot {
        self.synchronizer.records()
    }

    pub fn synchronizer(&self) -> &RecordSynchronizer {
        &self.synchronizer
    }

    fn session(&self) -> Option<Arc<Session>> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Active session, or an error status when no account is connected.
    pub(crate) fn require_session(&self) -> Result<Arc<Session>, ClientError> {
        self.session().ok_or_else(|| {
            let err = ClientError::ConnectionRequired;
            self.status.report(TxPhase::Error, err.to_string());
            err
        })
    }

    /// Initialize the confidential subsystem for the active session.
    pub async fn initialize(&self) -> Result<(), ClientError> {
        let session = self.require_session()?;
        self.ensure_initialized(&session).await
    }

    pub(crate) async fn ensure_initialized(&self, session: &Session) -> Result<(), ClientError> {
        session
            .ensure_initialized(self.confidential.as_ref())
            .await
            .map_err(|e| {
                warn!(error = %e, "Confidential subsystem initialization failed");
                self.status
                    .report(TxPhase::Error, "Confidential subsystem initialization failed");
                ClientError::InitializationFailure(e)
            })
    }

    /// Run a synchronisation pass. Failure is reported and returned.
    pub async fn refresh(&self) -> Result<RecordSnapshot, ClientError> {
        if !self.is_connected() {
            return Ok(self.records());
        }
        self.synchronizer.refresh().await.map_err(|e| {
            warn!(error = %e, "Record synchronisation failed");
            self.status.report(TxPhase::Error, "Failed to load data");
            ClientError::from(e)
        })
    }

    /// Probe the contract. Only a positive answer is reported.
    pub async fn check_availability(&self) -> bool {
        match self.gateway.probe_availability().await {
            Ok(true) => {
                self.status.report(TxPhase::Success, "FHE system is available!");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, "Availability check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{account, connected_client, seeded_ledger, InMemoryLedger};

    #[tokio::test]
    async fn disconnected_client_requires_connection() {
        let (_, service, client) = connected_client(InMemoryLedger::new());
        client.disconnect();

        let err = client.initialize().await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionRequired));
        assert_eq!(client.current_status().message, "Please connect wallet first");
        assert_eq!(service.init_calls(), 0);
    }

    #[tokio::test]
    async fn reconnecting_starts_a_new_session() {
        let (_, _, client) = connected_client(InMemoryLedger::new());
        client.initialize().await.unwrap();
        assert!(client.is_initialized());

        client.connect(account());
        assert!(!client.is_initialized());
        assert_eq!(client.account(), Some(account()));
    }

    #[tokio::test]
    async fn initialization_failure_is_reported() {
        let (_, service, client) = connected_client(InMemoryLedger::new());
        service.fail_initialize(true);

        let err = client.initialize().await.unwrap_err();
        assert!(matches!(err, ClientError::InitializationFailure(_)));
        let status = client.current_status();
        assert_eq!(status.phase, TxPhase::Error);
        assert_eq!(status.message, "Confidential subsystem initialization failed");
    }

    #[tokio::test]
    async fn refresh_failure_reports_error_status() {
        let (ledger, _, client) = connected_client(seeded_ledger(1));
        ledger.fail_listing(true);

        let err = client.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::Sync(_)));
        assert_eq!(client.current_status().message, "Failed to load data");
    }

    #[tokio::test]
    async fn availability_reports_success_only() {
        let (ledger, _, client) = connected_client(InMemoryLedger::new());
        assert!(client.check_availability().await);
        assert_eq!(client.current_status().message, "FHE system is available!");

        client.status().clear();
        ledger.set_available(false);
        assert!(!client.check_availability().await);
        assert!(!client.current_status().visible);
    }
}
