use std::sync::Arc;

use crate::api::types::HealthResponse;
use crate::config_store::ClientConfig;
use crate::errors::WalletResult;
use crate::service_client::{WalletApi, WalletServiceClient};
use crate::session::{SessionSnapshot, WalletSession};
use crate::transfer::{TransferController, TransferSnapshot};

/// Everything a front end needs: configuration plus the two components,
/// sharing one wallet-service connection.
pub struct WalletContext {
    config: ClientConfig,
    api: Arc<dyn WalletApi>,
    session: WalletSession,
    transfer: TransferController,
}

impl WalletContext {
    /// Build a context talking HTTP to the configured wallet service.
    pub fn initialize(config: ClientConfig) -> WalletResult<Self> {
        config.validate()?;
        let client = WalletServiceClient::from_config(&config.api)?;
        log::info!(
            "Wallet service at {} ({} environment)",
            client.base_url(),
            config.environment
        );
        Self::with_api(config, Arc::new(client))
    }

    /// Build a context over any [`WalletApi`] implementation.
    pub fn with_api(config: ClientConfig, api: Arc<dyn WalletApi>) -> WalletResult<Self> {
        let session = WalletSession::new(Arc::clone(&api))?;
        let transfer = TransferController::new(Arc::clone(&api), session.reader())?;
        Ok(Self {
            config,
            api,
            session,
            transfer,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn transfer(&self) -> &TransferController {
        &self.transfer
    }

    pub fn snapshot(&self) -> (SessionSnapshot, TransferSnapshot) {
        (self.session.snapshot(), self.transfer.snapshot())
    }

    pub async fn health(&self) -> WalletResult<HealthResponse> {
        self.api.health().await
    }
}
