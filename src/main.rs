// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use alloy::{network::EthereumWallet, primitives::Address};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use repo_ledger::{
    api::router,
    blockchain::{signing, LedgerClient},
    client::RegistryClient,
    confidential::{ConfidentialValueService, RelayerClient},
    config::{ClientConfig, SignerSource, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    ledger::{LedgerError, LedgerGateway},
    state::AppState,
    status::TxStatusNotifier,
};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_signer(source: &SignerSource) -> Result<(Address, EthereumWallet), LedgerError> {
    let signer = match source {
        SignerSource::Hex(key) => signing::signer_from_hex(key)?,
        SignerSource::PemFile(path) => signing::signer_from_pem_file(path)?,
    };
    Ok(signing::wallet_from_signer(signer))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ClientConfig::from_env().expect("Invalid configuration");

    let account = config
        .signer
        .as_ref()
        .map(load_signer)
        .transpose()
        .expect("Failed to load account key");
    let (account, wallet) = account.unzip();

    let ledger = LedgerClient::new(
        config.network.clone(),
        &config.rpc_url,
        config.contract_address,
        wallet,
    )
    .expect("Failed to create ledger client");
    if !ledger.can_sign() {
        warn!("No signing key configured, running read-only");
    }
    let relayer = RelayerClient::new(&config.relayer_url).expect("Failed to create relayer client");

    let client = RegistryClient::new(
        Arc::new(ledger) as Arc<dyn LedgerGateway>,
        Arc::new(relayer) as Arc<dyn ConfidentialValueService>,
        TxStatusNotifier::new(),
    );

    info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        contract = %config.contract_address,
        "Registry client configured"
    );

    match account {
        Some(account) => {
            client.connect(account);
            if let Err(e) = client.initialize().await {
                warn!(error = %e, "Confidential subsystem not ready, will retry on first use");
            }
        }
        None => info!("Skipping confidential subsystem initialization"),
    }

    match client.refresh().await {
        Ok(records) => info!(count = records.len(), "Initial record synchronisation complete"),
        Err(e) => error!(error = %e, "Initial record synchronisation failed"),
    }

    let app = router(AppState::new(client));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!("Repo ledger listening on http://{} (docs at /docs)", config.bind_addr);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                signal.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .expect("HTTP server failed");
}
