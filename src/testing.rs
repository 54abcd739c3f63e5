// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger and scripted confidential service for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use futures::FutureExt;

use crate::client::RegistryClient;
use crate::confidential::{
    ConfidentialError, ConfidentialValueService, EncryptedInput, ProofReadyFn, VerifiedDecryption,
};
use crate::ledger::{
    CiphertextHandle, LedgerError, LedgerGateway, LedgerRecord, NewRecord, PendingTx, TxReceipt,
};
use crate::status::TxStatusNotifier;

/// Account used as the connected signer in tests.
pub fn account() -> Address {
    Address::repeat_byte(0x5a)
}

pub fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

fn handle_for(n: u64) -> CiphertextHandle {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    B256::from(bytes)
}

fn encode_clear_value(value: u32) -> [u8; 32] {
    U256::from(value).to_be_bytes::<32>()
}

struct StoredRecord {
    id: String,
    data: LedgerRecord,
    handle: CiphertextHandle,
}

#[derive(Default)]
struct LedgerState {
    records: Vec<StoredRecord>,
    ciphertexts: HashMap<CiphertextHandle, u32>,
    broken: HashSet<String>,
    fail_listing: bool,
    reject_signatures: bool,
    race_verification: bool,
    unavailable: bool,
    hold_confirmations: bool,
    clock: u64,
    blocks: u64,
    create_calls: usize,
    attempted_ids: Vec<String>,
    verification_calls: usize,
}

impl LedgerState {
    fn find_mut(&mut self, id: &str) -> Option<&mut StoredRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Pending transaction for the next block. Never resolves while
    /// confirmations are held.
    fn pending_tx(&mut self) -> PendingTx {
        let receipt = self.receipt();
        if self.hold_confirmations {
            PendingTx::new(
                receipt.tx_hash,
                futures::future::pending::<Result<TxReceipt, LedgerError>>().boxed(),
            )
        } else {
            PendingTx::confirmed(receipt)
        }
    }

    fn receipt(&mut self) -> TxReceipt {
        self.blocks += 1;
        TxReceipt {
            tx_hash: format!("0x{:064x}", self.blocks),
            block_number: self.blocks,
            gas_used: 50_000,
            success: true,
        }
    }
}

/// Ledger that keeps records in insertion order.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                clock: 1_700_000_000,
                ..LedgerState::default()
            }),
        }
    }

    /// Insert an unverified record whose ciphertext holds `files * 100`.
    pub fn seed(&self, id: &str, name: &str, files: u64) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let handle = handle_for(10_000 + state.records.len() as u64);
        state.ciphertexts.insert(handle, (files * 100) as u32);
        let data = LedgerRecord {
            name: name.to_string(),
            description: format!("{name} description"),
            timestamp: state.clock,
            creator: Address::repeat_byte(state.records.len() as u8 + 1),
            file_count: files,
            is_verified: false,
            revealed_value: 0,
        };
        state.records.push(StoredRecord {
            id: id.to_string(),
            data,
            handle,
        });
    }

    pub fn store_ciphertext(&self, handle: CiphertextHandle, plaintext: u32) {
        self.state.lock().unwrap().ciphertexts.insert(handle, plaintext);
    }

    pub fn ciphertext(&self, handle: &CiphertextHandle) -> Option<u32> {
        self.state.lock().unwrap().ciphertexts.get(handle).copied()
    }

    /// Mark a record verified as if another party had done it.
    pub fn verify_externally(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        let ciphertexts = state.ciphertexts.clone();
        if let Some(record) = state.find_mut(id) {
            record.data.is_verified = true;
            record.data.revealed_value = ciphertexts.get(&record.handle).copied().unwrap_or(0);
        }
    }

    pub fn break_record(&self, id: &str) {
        self.state.lock().unwrap().broken.insert(id.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    pub fn reject_signatures(&self, reject: bool) {
        self.state.lock().unwrap().reject_signatures = reject;
    }

    /// The next verification finds the record already verified by someone else.
    pub fn race_verification(&self, race: bool) {
        self.state.lock().unwrap().race_verification = race;
    }

    pub fn hold_confirmations(&self, hold: bool) {
        self.state.lock().unwrap().hold_confirmations = hold;
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().unavailable = !available;
    }

    pub fn record(&self, id: &str) -> Option<LedgerRecord> {
        let state = self.state.lock().unwrap();
        state.records.iter().find(|r| r.id == id).map(|r| r.data.clone())
    }

    pub fn record_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    /// Identifiers of every creation attempt, including rejected ones.
    pub fn attempted_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().attempted_ids.clone()
    }

    pub fn verification_calls(&self) -> usize {
        self.state.lock().unwrap().verification_calls
    }
}

/// Ledger with `repo-1..=repo-n`.
pub fn seeded_ledger(n: usize) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    for i in 1..=n {
        ledger.seed(&format!("repo-{i}"), &format!("lib-{i}"), i as u64);
    }
    ledger
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    fn contract_address(&self) -> Address {
        contract()
    }

    async fn list_record_ids(&self) -> Result<Vec<String>, LedgerError> {
        if self.state.lock().unwrap().fail_listing {
            return Err(LedgerError::Rpc("connection refused".to_string()));
        }
        Ok(self.record_ids())
    }

    async fn get_record(&self, id: &str) -> Result<LedgerRecord, LedgerError> {
        if self.state.lock().unwrap().broken.contains(id) {
            return Err(LedgerError::Contract("malformed record".to_string()));
        }
        self.record(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))
    }

    async fn get_encrypted_handle(&self, id: &str) -> Result<CiphertextHandle, LedgerError> {
        let state = self.state.lock().unwrap();
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.handle)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))
    }

    async fn create_record(&self, record: NewRecord) -> Result<PendingTx, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        state.attempted_ids.push(record.id.clone());
        if state.reject_signatures {
            return Err(LedgerError::UserRejected("user rejected transaction".to_string()));
        }
        if state.records.iter().any(|r| r.id == record.id) {
            return Err(LedgerError::Contract("Business data already exists".to_string()));
        }

        state.clock += 1;
        let data = LedgerRecord {
            name: record.name,
            description: record.description,
            timestamp: state.clock,
            creator: account(),
            file_count: record.file_count,
            is_verified: false,
            revealed_value: 0,
        };
        state.records.push(StoredRecord {
            id: record.id,
            data,
            handle: record.ciphertext,
        });
        Ok(state.pending_tx())
    }

    async fn submit_verification(
        &self,
        id: &str,
        clear_values: Bytes,
        _proof: Bytes,
    ) -> Result<PendingTx, LedgerError> {
        let mut state = self.state.lock().unwrap();
        state.verification_calls += 1;
        if clear_values.len() < 32 {
            return Err(LedgerError::Contract("invalid clear values".to_string()));
        }
        let value = u32::try_from(U256::from_be_slice(&clear_values[..32]))
            .map_err(|e| LedgerError::Contract(e.to_string()))?;

        let race = std::mem::take(&mut state.race_verification);
        let record = state
            .find_mut(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;
        if race {
            record.data.is_verified = true;
            record.data.revealed_value = value;
        }
        if record.data.is_verified {
            return Err(LedgerError::AlreadyVerified(
                "execution reverted: Data already verified".to_string(),
            ));
        }

        record.data.is_verified = true;
        record.data.revealed_value = value;
        Ok(state.pending_tx())
    }

    async fn probe_availability(&self) -> Result<bool, LedgerError> {
        Ok(!self.state.lock().unwrap().unavailable)
    }
}

/// Confidential service whose "ciphertexts" live in the in-memory ledger.
pub struct FakeConfidentialService {
    ledger: Arc<InMemoryLedger>,
    initialized: AtomicBool,
    fail_initialize: AtomicBool,
    fail_encrypt: AtomicBool,
    init_delay: Mutex<Duration>,
    init_calls: AtomicUsize,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
    next_handle: AtomicU64,
}

impl FakeConfidentialService {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            ledger,
            initialized: AtomicBool::new(false),
            fail_initialize: AtomicBool::new(false),
            fail_encrypt: AtomicBool::new(false),
            init_delay: Mutex::new(Duration::ZERO),
            init_calls: AtomicUsize::new(0),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn fail_initialize(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn fail_encrypt(&self, fail: bool) {
        self.fail_encrypt.store(fail, Ordering::SeqCst);
    }

    pub fn set_init_delay(&self, delay: Duration) {
        *self.init_delay.lock().unwrap() = delay;
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfidentialValueService for FakeConfidentialService {
    async fn initialize(&self) -> Result<(), ConfidentialError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.init_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(ConfidentialError::Initialization("relayer unreachable".to_string()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn encrypt(
        &self,
        _contract: Address,
        _account: Address,
        plaintext: u32,
    ) -> Result<EncryptedInput, ConfidentialError> {
        if !self.is_initialized() {
            return Err(ConfidentialError::NotInitialized);
        }
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(ConfidentialError::Encryption("relayer unavailable".to_string()));
        }

        let handle = handle_for(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.ledger.store_ciphertext(handle, plaintext);
        Ok(EncryptedInput {
            ciphertext: handle,
            proof: Bytes::from_static(b"input-proof"),
        })
    }

    async fn verify_decryption(
        &self,
        handles: Vec<CiphertextHandle>,
        _contract: Address,
        on_proof_ready: ProofReadyFn,
    ) -> Result<VerifiedDecryption, ConfidentialError> {
        if !self.is_initialized() {
            return Err(ConfidentialError::NotInitialized);
        }
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);

        let mut clear_values = HashMap::new();
        let mut bundle = Vec::with_capacity(handles.len() * 32);
        for handle in handles {
            let value = self
                .ledger
                .ciphertext(&handle)
                .ok_or_else(|| ConfidentialError::Decryption(format!("unknown handle {handle}")))?;
            bundle.extend_from_slice(&encode_clear_value(value));
            clear_values.insert(handle, U256::from(value));
        }

        let receipt =
            on_proof_ready(Bytes::from(bundle), Bytes::from_static(b"decryption-proof")).await?;
        Ok(VerifiedDecryption {
            clear_values,
            receipt,
        })
    }
}

/// Client connected as [`account`] over a fresh ledger and service.
pub fn connected_client(
    ledger: InMemoryLedger,
) -> (Arc<InMemoryLedger>, Arc<FakeConfidentialService>, RegistryClient) {
    let ledger = Arc::new(ledger);
    let service = Arc::new(FakeConfidentialService::new(Arc::clone(&ledger)));
    let client = RegistryClient::new(
        Arc::clone(&ledger) as Arc<dyn LedgerGateway>,
        Arc::clone(&service) as Arc<dyn ConfidentialValueService>,
        TxStatusNotifier::new(),
    );
    client.connect(account());
    (ledger, service, client)
}
