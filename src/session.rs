// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account-scoped session.
//!
//! Initialization of the confidential value subsystem runs at most once per
//! session. Concurrent callers await the same in-flight attempt; a failed
//! attempt leaves the session uninitialized so a later call can retry.

use alloy::primitives::Address;
use tokio::sync::OnceCell;

use crate::confidential::{ConfidentialError, ConfidentialValueService};

#[derive(Debug)]
pub struct Session {
    account: Address,
    initialized: OnceCell<()>,
}

impl Session {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            initialized: OnceCell::new(),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    pub async fn ensure_initialized(
        &self,
        service: &dyn ConfidentialValueService,
    ) -> Result<(), ConfidentialError> {
        self.initialized
            .get_or_try_init(|| async {
                if service.is_initialized() {
                    return Ok(());
                }
                tracing::info!(account = %self.account, "Initializing confidential subsystem");
                service.initialize().await
            })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::testing::{account, FakeConfidentialService, InMemoryLedger};

    fn service() -> Arc<FakeConfidentialService> {
        Arc::new(FakeConfidentialService::new(Arc::new(InMemoryLedger::new())))
    }

    #[tokio::test]
    async fn initializes_once() {
        let service = service();
        let session = Session::new(account());

        session.ensure_initialized(service.as_ref()).await.unwrap();
        session.ensure_initialized(service.as_ref()).await.unwrap();

        assert!(session.is_initialized());
        assert_eq!(service.init_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_initialization_is_deduplicated() {
        let service = service();
        service.set_init_delay(Duration::from_millis(50));
        let session = Arc::new(Session::new(account()));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                let service = Arc::clone(&service);
                tokio::spawn(async move { session.ensure_initialized(service.as_ref()).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(service.init_calls(), 1);
    }

    #[tokio::test]
    async fn failed_initialization_can_be_retried() {
        let service = service();
        service.fail_initialize(true);
        let session = Session::new(account());

        let err = session.ensure_initialized(service.as_ref()).await.unwrap_err();
        assert!(matches!(err, ConfidentialError::Initialization(_)));
        assert!(!session.is_initialized());

        service.fail_initialize(false);
        session.ensure_initialized(service.as_ref()).await.unwrap();
        assert!(session.is_initialized());
        assert_eq!(service.init_calls(), 2);
    }
}
