use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::{WalletError, WalletResult};
use crate::inflight::{InFlight, RequestState};
use crate::service_client::WalletApi;
use crate::session::SessionReader;
use crate::validation::InputValidator;
use crate::wallet_error;

#[derive(Debug, Default)]
struct TransferState {
    recipient: String,
    amount: String,
    pending: bool,
    last_error: Option<WalletError>,
    last_tx_id: Option<String>,
}

impl RequestState for TransferState {
    fn is_pending(&self) -> bool {
        self.pending
    }

    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    fn set_last_error(&mut self, error: Option<WalletError>) {
        self.last_error = error;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSnapshot {
    pub recipient: String,
    pub amount: String,
    pub pending: bool,
    pub last_error: Option<WalletError>,
    pub last_tx_id: Option<String>,
}

/// Form state and submission of one outbound ETH transfer.
///
/// Recipient and amount are kept exactly as typed until a send succeeds, so
/// a failed attempt can be retried without re-entering them.
pub struct TransferController {
    api: Arc<dyn WalletApi>,
    session: SessionReader,
    state: Arc<RwLock<TransferState>>,
    validator: InputValidator,
}

impl TransferController {
    pub fn new(api: Arc<dyn WalletApi>, session: SessionReader) -> WalletResult<Self> {
        Ok(Self {
            api,
            session,
            state: Arc::new(RwLock::new(TransferState::default())),
            validator: InputValidator::new()?,
        })
    }

    pub fn snapshot(&self) -> TransferSnapshot {
        let state = self.state.read();
        TransferSnapshot {
            recipient: state.recipient.clone(),
            amount: state.amount.clone(),
            pending: state.pending,
            last_error: state.last_error.clone(),
            last_tx_id: state.last_tx_id.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.read().pending
    }

    pub fn last_error(&self) -> Option<WalletError> {
        self.state.read().last_error.clone()
    }

    pub fn last_tx_id(&self) -> Option<String> {
        self.state.read().last_tx_id.clone()
    }

    pub fn set_recipient(&self, recipient: &str) {
        self.state.write().recipient = recipient.to_string();
    }

    pub fn set_amount(&self, amount: &str) {
        self.state.write().amount = amount.to_string();
    }

    /// Fill in the form and submit it in one step.
    ///
    /// While a send is outstanding the call fails with [`WalletError::Busy`]
    /// and the form is left as it was.
    pub async fn send_funds(&self, recipient: &str, amount: &str) -> WalletResult<String> {
        self.submit_with(Some((recipient, amount))).await
    }

    /// Submit the recipient and amount currently in the form. Returns the tx hash.
    pub async fn submit(&self) -> WalletResult<String> {
        self.submit_with(None).await
    }

    async fn submit_with(&self, entry: Option<(&str, &str)>) -> WalletResult<String> {
        let (flight, (recipient, amount, private_key)) =
            InFlight::start(&self.state, "send_funds", |state| {
                if let Some((recipient, amount)) = entry {
                    state.recipient = recipient.to_string();
                    state.amount = amount.to_string();
                }

                let recipient = self
                    .validator
                    .validate_recipient(&state.recipient)?
                    .to_string();
                let amount = self.validator.validate_amount(&state.amount)?;
                let private_key = self.session.private_key().ok_or_else(|| {
                    wallet_error!(
                        PreconditionError,
                        "Please generate or import a wallet first"
                    )
                })?;
                Ok((recipient, amount, private_key))
            })?;

        log::info!("Sending {} to {}", amount, recipient);
        let outcome = self
            .api
            .send_eth(&recipient, amount, private_key.as_str())
            .await;

        flight.settle(outcome, |state, response| {
            if let Some(message) = &response.message {
                log::info!("{}: {}", message, response.tx_hash);
            }
            state.recipient.clear();
            state.amount.clear();
            state.last_tx_id = Some(response.tx_hash.clone());
            response.tx_hash
        })
    }
}
