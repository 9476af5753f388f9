use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Semaphore;

use crate::api::types::{
    BalanceResponse, ConnectResponse, GenerateWalletResponse, HealthResponse,
    ImportWalletResponse, SendEthResponse,
};
use crate::blockchain::EthAmount;
use crate::errors::WalletResult;
use crate::service_client::WalletApi;

pub const STUB_ETH_ADDRESS: &str = "0x1111111111111111111111111111111111111111";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Generate,
    Import(String),
    Connect,
    Balance(String),
    Send {
        to_address: String,
        amount: String,
        private_key: String,
    },
}

/// In-process wallet service with scripted responses.
///
/// Queued results are returned first; an empty queue answers with a fixed
/// successful response. A gated stub holds every request until `release`.
#[derive(Default)]
pub struct StubApi {
    calls: Mutex<Vec<ApiCall>>,
    generate: Mutex<VecDeque<WalletResult<GenerateWalletResponse>>>,
    import: Mutex<VecDeque<WalletResult<ImportWalletResponse>>>,
    connect: Mutex<VecDeque<WalletResult<ConnectResponse>>>,
    balance: Mutex<VecDeque<WalletResult<BalanceResponse>>>,
    send: Mutex<VecDeque<WalletResult<SendEthResponse>>>,
    gate: Option<Semaphore>,
}

impl StubApi {
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Let one held request complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn push_generate(&self, result: WalletResult<GenerateWalletResponse>) {
        self.generate.lock().push_back(result);
    }

    pub fn push_import(&self, result: WalletResult<ImportWalletResponse>) {
        self.import.lock().push_back(result);
    }

    pub fn push_connect(&self, result: WalletResult<ConnectResponse>) {
        self.connect.lock().push_back(result);
    }

    pub fn push_balance(&self, result: WalletResult<BalanceResponse>) {
        self.balance.lock().push_back(result);
    }

    pub fn push_send(&self, result: WalletResult<SendEthResponse>) {
        self.send.lock().push_back(result);
    }

    async fn respond<T>(
        &self,
        call: ApiCall,
        queue: &Mutex<VecDeque<WalletResult<T>>>,
        default: impl FnOnce() -> T,
    ) -> WalletResult<T> {
        self.calls.lock().push(call);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let queued = queue.lock().pop_front();
        queued.unwrap_or_else(|| Ok(default()))
    }
}

#[async_trait]
impl WalletApi for StubApi {
    async fn generate_wallet(&self) -> WalletResult<GenerateWalletResponse> {
        self.respond(ApiCall::Generate, &self.generate, || GenerateWalletResponse {
            btc_address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_string(),
            eth_address: STUB_ETH_ADDRESS.to_string(),
            wif: "L1wif".to_string(),
            private_key: "a1b2c3".to_string(),
            public_key: Some("04ffee".to_string()),
        })
        .await
    }

    async fn import_wallet(&self, private_key: &str) -> WalletResult<ImportWalletResponse> {
        self.respond(
            ApiCall::Import(private_key.to_string()),
            &self.import,
            || ImportWalletResponse {
                btc_address: "1ImportedBtcAddress".to_string(),
                eth_address: "0x2222222222222222222222222222222222222222".to_string(),
                wif: None,
            },
        )
        .await
    }

    async fn connect_ethereum(&self) -> WalletResult<ConnectResponse> {
        self.respond(ApiCall::Connect, &self.connect, || ConnectResponse {
            address: Some(STUB_ETH_ADDRESS.to_string()),
            message: Some("Connected to Ethereum".to_string()),
        })
        .await
    }

    async fn get_balance(&self, address: &str) -> WalletResult<BalanceResponse> {
        self.respond(
            ApiCall::Balance(address.to_string()),
            &self.balance,
            || BalanceResponse {
                balance: 1.5,
                balance_wei: Some(1_500_000_000_000_000_000),
            },
        )
        .await
    }

    async fn send_eth(
        &self,
        to_address: &str,
        amount: EthAmount,
        private_key: &str,
    ) -> WalletResult<SendEthResponse> {
        let call = ApiCall::Send {
            to_address: to_address.to_string(),
            amount: amount.as_string(),
            private_key: private_key.to_string(),
        };
        self.respond(call, &self.send, || SendEthResponse {
            tx_hash: "0xdeadbeef".to_string(),
            message: Some("Transaction sent successfully".to_string()),
        })
        .await
    }

    async fn health(&self) -> WalletResult<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".to_string(),
        })
    }
}
