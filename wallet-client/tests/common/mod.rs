#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use multinet_wallet_lib::{
    BalanceResponse, ConnectResponse, EthAmount, GenerateWalletResponse, HealthResponse,
    ImportWalletResponse, SendEthResponse, WalletApi, WalletResult,
};
use tokio::sync::Semaphore;

/// Scripted wallet service: queued results first, then fixed successes.
#[derive(Default)]
pub struct ScriptedApi {
    pub requests: AtomicUsize,
    pub send_requests: AtomicUsize,
    pub import_keys: Mutex<Vec<String>>,
    pub imports: Mutex<VecDeque<WalletResult<ImportWalletResponse>>>,
    pub sends: Mutex<VecDeque<WalletResult<SendEthResponse>>>,
    gate: Option<Semaphore>,
}

impl ScriptedApi {
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn send_requests(&self) -> usize {
        self.send_requests.load(Ordering::SeqCst)
    }

    async fn hold(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl WalletApi for ScriptedApi {
    async fn generate_wallet(&self) -> WalletResult<GenerateWalletResponse> {
        self.hold().await;
        Ok(GenerateWalletResponse {
            btc_address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_string(),
            eth_address: "0x71C7656EC7ab88b098defB751B7401B5f6d8976F".to_string(),
            wif: "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn".to_string(),
            private_key: "0000000000000000000000000000000000000000000000000000000000000001"
                .to_string(),
            public_key: None,
        })
    }

    async fn import_wallet(&self, private_key: &str) -> WalletResult<ImportWalletResponse> {
        self.import_keys.lock().push(private_key.to_string());
        self.hold().await;
        let queued = self.imports.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(ImportWalletResponse {
                btc_address: "1ImportedBtcAddress".to_string(),
                eth_address: "0x2222222222222222222222222222222222222222".to_string(),
                wif: None,
            })
        })
    }

    async fn connect_ethereum(&self) -> WalletResult<ConnectResponse> {
        self.hold().await;
        Ok(ConnectResponse::default())
    }

    async fn get_balance(&self, _address: &str) -> WalletResult<BalanceResponse> {
        self.hold().await;
        Ok(BalanceResponse {
            balance: 2.0,
            balance_wei: None,
        })
    }

    async fn send_eth(
        &self,
        _to_address: &str,
        _amount: EthAmount,
        _private_key: &str,
    ) -> WalletResult<SendEthResponse> {
        self.send_requests.fetch_add(1, Ordering::SeqCst);
        self.hold().await;
        let queued = self.sends.lock().pop_front();
        queued.unwrap_or_else(|| {
            Ok(SendEthResponse {
                tx_hash: "0xdeadbeef".to_string(),
                message: None,
            })
        })
    }

    async fn health(&self) -> WalletResult<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".to_string(),
        })
    }
}
