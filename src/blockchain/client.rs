// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM client for the repository registry contract.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use futures::FutureExt;

use super::registry::IRepoRegistry;
use super::types::NetworkConfig;
use crate::ledger::{
    CiphertextHandle, LedgerError, LedgerGateway, LedgerRecord, NewRecord, PendingTx, TxReceipt,
};

type RegistryInstance = IRepoRegistry::IRepoRegistryInstance<DynProvider>;

/// Ledger gateway backed by an alloy HTTP provider.
///
/// Reads go through an unsigned provider. Mutations need the signing
/// provider, which only exists when an account key was supplied.
pub struct LedgerClient {
    /// Network configuration
    network: NetworkConfig,
    contract_address: Address,
    reader: RegistryInstance,
    writer: Option<RegistryInstance>,
}

impl LedgerClient {
    /// Create a client for the registry at `contract_address`.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        contract_address: Address,
        wallet: Option<EthereumWallet>,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let reader = IRepoRegistry::new(
            contract_address,
            ProviderBuilder::new().connect_http(url.clone()).erased(),
        );
        let writer = wallet.map(|wallet| {
            IRepoRegistry::new(
                contract_address,
                ProviderBuilder::new().wallet(wallet).connect_http(url).erased(),
            )
        });

        Ok(Self {
            network,
            contract_address,
            reader,
            writer,
        })
    }

    pub fn can_sign(&self) -> bool {
        self.writer.is_some()
    }

    fn writer(&self) -> Result<&RegistryInstance, LedgerError> {
        self.writer.as_ref().ok_or(LedgerError::SignerUnavailable)
    }

    /// Wrap a sent transaction so the caller can await its receipt.
    fn track(&self, pending: PendingTransactionBuilder<Ethereum>) -> PendingTx {
        let tx_hash = format!("{:#x}", pending.tx_hash());
        if let Some(url) = self.network.tx_url(&tx_hash) {
            tracing::debug!(tx_hash = %tx_hash, explorer = %url, "Transaction sent");
        }

        let hash = tx_hash.clone();
        let confirmation = async move {
            let receipt = pending.get_receipt().await.map_err(|e| {
                LedgerError::TransactionFailed(format!("Failed to get receipt: {}", e))
            })?;
            Ok(TxReceipt {
                tx_hash: hash,
                block_number: receipt.block_number.unwrap_or(0),
                gas_used: receipt.gas_used as u64,
                success: receipt.status(),
            })
        }
        .boxed();

        PendingTx::new(tx_hash, confirmation)
    }
}

fn contract_error(e: alloy::contract::Error) -> LedgerError {
    LedgerError::classify(e.to_string(), LedgerError::Contract)
}

/// Saturating conversion for public numeric attributes.
fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl LedgerGateway for LedgerClient {
    fn contract_address(&self) -> Address {
        self.contract_address
    }

    async fn list_record_ids(&self) -> Result<Vec<String>, LedgerError> {
        self.reader
            .getAllBusinessIds()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn get_record(&self, id: &str) -> Result<LedgerRecord, LedgerError> {
        let data = self
            .reader
            .getBusinessData(id.to_string())
            .call()
            .await
            .map_err(contract_error)?;

        // Unknown identifiers read back as zeroed storage.
        if data.creator == Address::ZERO {
            return Err(LedgerError::RecordNotFound(id.to_string()));
        }

        Ok(LedgerRecord {
            name: data.name,
            description: data.description,
            timestamp: to_u64(data.timestamp),
            creator: data.creator,
            file_count: to_u64(data.publicValue1),
            is_verified: data.isVerified,
            revealed_value: data.decryptedValue,
        })
    }

    async fn get_encrypted_handle(&self, id: &str) -> Result<CiphertextHandle, LedgerError> {
        self.reader
            .getEncryptedValue(id.to_string())
            .call()
            .await
            .map_err(contract_error)
    }

    async fn create_record(&self, record: NewRecord) -> Result<PendingTx, LedgerError> {
        let pending = self
            .writer()?
            .createBusinessData(
                record.id,
                record.name,
                record.ciphertext,
                record.proof,
                U256::from(record.file_count),
                U256::ZERO,
                record.description,
            )
            .send()
            .await
            .map_err(contract_error)?;

        Ok(self.track(pending))
    }

    async fn submit_verification(
        &self,
        id: &str,
        clear_values: Bytes,
        proof: Bytes,
    ) -> Result<PendingTx, LedgerError> {
        let pending = self
            .writer()?
            .verifyDecryption(id.to_string(), clear_values, proof)
            .send()
            .await
            .map_err(contract_error)?;

        Ok(self.track(pending))
    }

    async fn probe_availability(&self) -> Result<bool, LedgerError> {
        self.reader
            .isAvailable()
            .call()
            .await
            .map_err(contract_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{LOCAL_DEV, SEPOLIA};

    #[test]
    fn invalid_rpc_url_is_rejected() {
        let result = LedgerClient::new(SEPOLIA, "not a url", Address::ZERO, None);
        assert!(matches!(result, Err(LedgerError::InvalidRpcUrl(_))));
    }

    #[tokio::test]
    async fn read_only_client_cannot_submit() {
        let client =
            LedgerClient::new(LOCAL_DEV, LOCAL_DEV.rpc_url, Address::repeat_byte(7), None).unwrap();
        assert!(!client.can_sign());
        assert_eq!(client.contract_address(), Address::repeat_byte(7));

        let err = client
            .submit_verification("repo-1", Bytes::new(), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::SignerUnavailable);
    }

    #[test]
    fn large_public_values_saturate() {
        assert_eq!(to_u64(U256::from(12u64)), 12);
        assert_eq!(to_u64(U256::MAX), u64::MAX);
    }
}
