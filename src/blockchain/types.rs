// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network presets.

/// EVM network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia testnet, where the confidential coprocessor is deployed.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia",
    chain_id: 11155111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

/// Local development node (hardhat / anvil).
pub const LOCAL_DEV: NetworkConfig = NetworkConfig {
    name: "Local Dev",
    chain_id: 31337,
    rpc_url: "http://127.0.0.1:8545",
    explorer_url: "",
};

/// Look up a preset by chain id.
pub fn network_for_chain_id(chain_id: u64) -> Option<NetworkConfig> {
    [SEPOLIA, LOCAL_DEV]
        .into_iter()
        .find(|n| n.chain_id == chain_id)
}

impl NetworkConfig {
    /// Explorer link for a transaction, when the network has an explorer.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        (!self.explorer_url.is_empty()).then(|| format!("{}/tx/{}", self.explorer_url, tx_hash))
    }
}
