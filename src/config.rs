// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`ClientConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | JSON-RPC endpoint of the ledger | Sepolia public RPC |
//! | `CHAIN_ID` | Expected chain id | `11155111` |
//! | `REGISTRY_CONTRACT_ADDRESS` | Registry contract address | Required |
//! | `RELAYER_URL` | Confidential value relayer base URL | Required |
//! | `SIGNER_KEY` | Hex private key of the active account | Optional |
//! | `SIGNER_KEY_PEM_PATH` | PEM private key file of the active account | Optional |
//! | `HOST` | Server bind address | `127.0.0.1` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use alloy::primitives::Address;

use crate::blockchain::types::{network_for_chain_id, NetworkConfig, SEPOLIA};

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const REGISTRY_CONTRACT_ADDRESS_ENV: &str = "REGISTRY_CONTRACT_ADDRESS";
pub const RELAYER_URL_ENV: &str = "RELAYER_URL";

/// Hex private key of the account that signs registry transactions.
///
/// Takes precedence over [`SIGNER_KEY_PEM_PATH_ENV`]. When neither is set
/// the client runs read-only and every workflow reports a missing
/// connection.
pub const SIGNER_KEY_ENV: &str = "SIGNER_KEY";
pub const SIGNER_KEY_PEM_PATH_ENV: &str = "SIGNER_KEY_PEM_PATH";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// `json` selects structured output; anything else is human readable.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where the active account key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    Hex(String),
    PemFile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub contract_address: Address,
    pub relayer_url: String,
    pub signer: Option<SignerSource>,
    pub bind_addr: SocketAddr,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let chain_id = match get(CHAIN_ID_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: CHAIN_ID_ENV,
                reason: e.to_string(),
            })?,
            None => SEPOLIA.chain_id,
        };
        let network = network_for_chain_id(chain_id).ok_or_else(|| ConfigError::Invalid {
            name: CHAIN_ID_ENV,
            reason: format!("unsupported chain id {chain_id}"),
        })?;

        let rpc_url = get(RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string());

        let contract_address = get(REGISTRY_CONTRACT_ADDRESS_ENV)
            .ok_or(ConfigError::Missing(REGISTRY_CONTRACT_ADDRESS_ENV))?
            .trim()
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                name: REGISTRY_CONTRACT_ADDRESS_ENV,
                reason: e.to_string(),
            })?;

        let relayer_url = get(RELAYER_URL_ENV).ok_or(ConfigError::Missing(RELAYER_URL_ENV))?;
        url::Url::parse(&relayer_url).map_err(|e| ConfigError::Invalid {
            name: RELAYER_URL_ENV,
            reason: e.to_string(),
        })?;

        let signer = get(SIGNER_KEY_ENV)
            .map(SignerSource::Hex)
            .or_else(|| get(SIGNER_KEY_PEM_PATH_ENV).map(|p| SignerSource::PemFile(p.into())));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;

        Ok(Self {
            network,
            rpc_url,
            contract_address,
            relayer_url,
            signer,
            bind_addr,
        })
    }
}
