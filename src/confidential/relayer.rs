// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP relayer implementation of the confidential value service.
//!
//! ## Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET`  | `v1/keyurl` | Fetch key material (initialization) |
//! | `POST` | `v1/input-proof` | Encrypt a value for a contract/account |
//! | `POST` | `v1/public-decrypt` | Decrypt handles, return proof bundle |
//!
//! Hex fields are 0x-prefixed; cleartext values are decimal strings.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::{
    ConfidentialError, ConfidentialValueService, EncryptedInput, ProofReadyFn, VerifiedDecryption,
};
use crate::ledger::CiphertextHandle;

/// Relayer request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const KEY_URL_PATH: &str = "v1/keyurl";
const INPUT_PROOF_PATH: &str = "v1/input-proof";
const PUBLIC_DECRYPT_PATH: &str = "v1/public-decrypt";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest {
    contract_address: String,
    user_address: String,
    value: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProofResponse {
    handle: String,
    input_proof: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptRequest {
    ciphertext_handles: Vec<String>,
    contract_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptResponse {
    clear_values: HashMap<String, String>,
    abi_encoded_clear_values: String,
    decryption_proof: String,
}

/// Confidential value service backed by an HTTP relayer.
pub struct RelayerClient {
    base_url: Url,
    client: reqwest::Client,
    initialized: AtomicBool,
}

impl RelayerClient {
    /// Create a client for the relayer at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ConfidentialError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ConfidentialError::Transport(e.to_string()))?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ConfidentialError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            client,
            initialized: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConfidentialError> {
        self.base_url
            .join(path)
            .map_err(|e| ConfidentialError::Transport(e.to_string()))
    }

    fn require_initialized(&self) -> Result<(), ConfidentialError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ConfidentialError::NotInitialized)
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ConfidentialError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(|e| ConfidentialError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConfidentialError::Transport(format!(
                "HTTP {status} from {path}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ConfidentialError::Transport(e.to_string()))
    }
}

#[async_trait]
impl ConfidentialValueService for RelayerClient {
    async fn initialize(&self) -> Result<(), ConfidentialError> {
        if self.is_initialized() {
            return Ok(());
        }

        let response = self
            .client
            .get(self.endpoint(KEY_URL_PATH)?)
            .send()
            .await
            .map_err(|e| ConfidentialError::Initialization(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConfidentialError::Initialization(format!(
                "HTTP {} from key endpoint",
                response.status()
            )));
        }

        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!(relayer = %self.base_url, "Confidential relayer initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn encrypt(
        &self,
        contract: Address,
        account: Address,
        plaintext: u32,
    ) -> Result<EncryptedInput, ConfidentialError> {
        self.require_initialized()?;

        let request = InputProofRequest {
            contract_address: contract.to_string(),
            user_address: account.to_string(),
            value: plaintext,
        };
        let response: InputProofResponse = self.post_json(INPUT_PROOF_PATH, &request).await?;

        Ok(EncryptedInput {
            ciphertext: parse_handle(&response.handle).map_err(ConfidentialError::Encryption)?,
            proof: parse_bytes(&response.input_proof).map_err(ConfidentialError::Encryption)?,
        })
    }

    async fn verify_decryption(
        &self,
        handles: Vec<CiphertextHandle>,
        contract: Address,
        on_proof_ready: ProofReadyFn,
    ) -> Result<VerifiedDecryption, ConfidentialError> {
        self.require_initialized()?;

        let request = PublicDecryptRequest {
            ciphertext_handles: handles.iter().map(|h| format!("{h:#x}")).collect(),
            contract_address: contract.to_string(),
        };
        let response: PublicDecryptResponse =
            self.post_json(PUBLIC_DECRYPT_PATH, &request).await?;

        let clear_values =
            parse_clear_values(&response.clear_values).map_err(ConfidentialError::Decryption)?;
        let bundle =
            parse_bytes(&response.abi_encoded_clear_values).map_err(ConfidentialError::Decryption)?;
        let proof =
            parse_bytes(&response.decryption_proof).map_err(ConfidentialError::Decryption)?;

        tracing::debug!(handles = handles.len(), "Decryption proof ready, submitting");
        let receipt = on_proof_ready(bundle, proof).await?;

        Ok(VerifiedDecryption {
            clear_values,
            receipt,
        })
    }
}

/// Ensure the base URL ends with `/` so relative joins append.
fn normalize_base_url(raw: &str) -> Result<Url, ConfidentialError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfidentialError::Transport(e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_handle(raw: &str) -> Result<CiphertextHandle, String> {
    CiphertextHandle::from_str(raw.trim()).map_err(|e| format!("invalid handle {raw}: {e}"))
}

fn parse_bytes(raw: &str) -> Result<Bytes, String> {
    Bytes::from_str(raw.trim()).map_err(|e| format!("invalid hex payload: {e}"))
}

fn parse_clear_values(
    raw: &HashMap<String, String>,
) -> Result<HashMap<CiphertextHandle, U256>, String> {
    raw.iter()
        .map(|(handle, value)| {
            let handle = parse_handle(handle)?;
            let value = U256::from_str_radix(value.trim(), 10)
                .map_err(|e| format!("invalid clear value {value}: {e}"))?;
            Ok((handle, value))
        })
        .collect()
}
