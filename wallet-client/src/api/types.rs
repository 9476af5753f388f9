use serde::{Deserialize, Serialize};

use crate::blockchain::EthAmount;

/// Common envelope of every wallet-service response.
///
/// Result fields sit next to `success` in the same object; the endpoint's
/// response type is decoded from the same body once `success` is known.
#[derive(Debug, Deserialize)]
pub struct ServiceEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateWalletResponse {
    pub btc_address: String,
    pub eth_address: String,
    pub wif: String,
    pub private_key: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportWalletRequest<'a> {
    pub private_key: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportWalletResponse {
    pub btc_address: String,
    pub eth_address: String,
    #[serde(default)]
    pub wif: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceRequest<'a> {
    pub address: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
    #[serde(default)]
    pub balance_wei: Option<u128>,
}

#[derive(Debug, Serialize)]
pub struct SendEthRequest<'a> {
    pub to_address: &'a str,
    pub amount: EthAmount,
    pub private_key: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEthResponse {
    pub tx_hash: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
