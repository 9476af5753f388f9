//! HTTP client for the remote wallet service
//!
//! Every endpoint answers with a JSON envelope carrying a `success` flag and
//! either result fields or an `error` string. Domain failures come back with
//! 4xx/5xx status codes, so the envelope (not the status) decides the outcome.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use crate::api::types::{
    BalanceRequest, BalanceResponse, ConnectResponse, GenerateWalletResponse, HealthResponse,
    ImportWalletRequest, ImportWalletResponse, SendEthRequest, SendEthResponse, ServiceEnvelope,
};
use crate::blockchain::EthAmount;
use crate::config_store::ApiConfig;
use crate::errors::{WalletError, WalletResult};

/// Operations the session layer needs from the wallet service.
///
/// Implementations return [`WalletError::DomainError`] for `success: false`
/// envelopes and [`WalletError::TransportError`] for everything that kept a
/// usable envelope from arriving.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn generate_wallet(&self) -> WalletResult<GenerateWalletResponse>;

    async fn import_wallet(&self, private_key: &str) -> WalletResult<ImportWalletResponse>;

    async fn connect_ethereum(&self) -> WalletResult<ConnectResponse>;

    async fn get_balance(&self, address: &str) -> WalletResult<BalanceResponse>;

    async fn send_eth(
        &self,
        to_address: &str,
        amount: EthAmount,
        private_key: &str,
    ) -> WalletResult<SendEthResponse>;

    async fn health(&self) -> WalletResult<HealthResponse>;
}

#[derive(Debug, Clone)]
pub struct WalletServiceClient {
    client: Client,
    base_url: String,
}

impl WalletServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> WalletResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            WalletError::TransportError(format!("Failed to create HTTP client: {}", e))
        })?;

        let base_url: String = base_url.into();
        Ok(WalletServiceClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> WalletResult<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST to `<base_url>/<endpoint>` and decode the envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<serde_json::Value>,
        fallback_error: &str,
    ) -> WalletResult<T> {
        let request_id = Uuid::new_v4();
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("[{}] POST {}", request_id, url);

        let request = match body {
            Some(body) => self.client.post(&url).json(&body),
            None => self.client.post(&url).header(CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await.map_err(|e| {
            log::warn!("[{}] {} failed before a response: {}", request_id, endpoint, e);
            describe_send_error(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            WalletError::TransportError(format!("Failed to read response body: {}", e))
        })?;

        let envelope: ServiceEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            log::warn!(
                "[{}] {} returned an unreadable body (HTTP {})",
                request_id,
                endpoint,
                status
            );
            WalletError::TransportError(format!(
                "Failed to parse response (HTTP {}): {}",
                status, e
            ))
        })?;

        if !envelope.success {
            let message = envelope
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback_error.to_string());
            log::info!("[{}] {} rejected: {}", request_id, endpoint, message);
            return Err(WalletError::DomainError(message));
        }

        log::debug!("[{}] {} succeeded (HTTP {})", request_id, endpoint, status);
        serde_json::from_slice(&bytes).map_err(|e| {
            WalletError::TransportError(format!("Malformed {} response: {}", endpoint, e))
        })
    }
}

fn describe_send_error(error: reqwest::Error) -> WalletError {
    if error.is_timeout() {
        WalletError::TransportError("Request timed out".to_string())
    } else if error.is_connect() {
        WalletError::TransportError(format!("Connection failed: {}", error))
    } else {
        WalletError::TransportError(format!("HTTP request failed: {}", error))
    }
}

fn to_body<T: serde::Serialize>(request: &T) -> WalletResult<serde_json::Value> {
    serde_json::to_value(request)
        .map_err(|e| WalletError::ValidationError(format!("Failed to encode request: {}", e)))
}

#[async_trait]
impl WalletApi for WalletServiceClient {
    async fn generate_wallet(&self) -> WalletResult<GenerateWalletResponse> {
        self.call("generate-wallet", None, "Failed to generate wallet")
            .await
    }

    async fn import_wallet(&self, private_key: &str) -> WalletResult<ImportWalletResponse> {
        let body = to_body(&ImportWalletRequest { private_key })?;
        self.call("import-wallet", Some(body), "Failed to import wallet")
            .await
    }

    async fn connect_ethereum(&self) -> WalletResult<ConnectResponse> {
        self.call("connect-ethereum", None, "Failed to connect").await
    }

    async fn get_balance(&self, address: &str) -> WalletResult<BalanceResponse> {
        let body = to_body(&BalanceRequest { address })?;
        self.call("get-balance", Some(body), "Failed to get balance")
            .await
    }

    async fn send_eth(
        &self,
        to_address: &str,
        amount: EthAmount,
        private_key: &str,
    ) -> WalletResult<SendEthResponse> {
        let body = to_body(&SendEthRequest {
            to_address,
            amount,
            private_key,
        })?;
        self.call("send-eth", Some(body), "Failed to send ETH").await
    }

    async fn health(&self) -> WalletResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(describe_send_error)?;

        if !response.status().is_success() {
            return Err(WalletError::TransportError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::TransportError(format!("Failed to parse response: {}", e)))
    }
}
