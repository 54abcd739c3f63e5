// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account key loading.
//!
//! The connected account signs registry transactions. Its key is supplied
//! either as hex or as a SEC1/PKCS#8 PEM file.

use std::path::Path;

use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};
use k256::SecretKey;

use crate::ledger::LedgerError;

/// Parse a PEM-encoded secp256k1 key into a hex string (no 0x prefix).
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, LedgerError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| LedgerError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key. A leading `0x` is accepted.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
    let trimmed = private_key_hex.trim();
    let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))
}

pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, LedgerError> {
    signer_from_hex(&pem_to_hex(pem_bytes)?)
}

/// Read a PEM key file and build a signer from it.
pub fn signer_from_pem_file(path: impl AsRef<Path>) -> Result<PrivateKeySigner, LedgerError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        LedgerError::InvalidPrivateKey(format!("Failed to read {}: {}", path.display(), e))
    })?;
    signer_from_pem(&bytes)
}

/// Wrap a signer for use by a signing provider, returning the account it controls.
pub fn wallet_from_signer(signer: PrivateKeySigner) -> (Address, EthereumWallet) {
    let account = signer.address();
    (account, EthereumWallet::from(signer))
}
