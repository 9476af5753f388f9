use parking_lot::{Mutex, RwLock};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;

use zeroize::{Zeroize, Zeroizing};

use crate::api::types::{GenerateWalletResponse, ImportWalletResponse};
use crate::blockchain::Balance;
use crate::errors::{WalletError, WalletResult};
use crate::inflight::{InFlight, RequestState};
use crate::service_client::WalletApi;
use crate::validation::InputValidator;
use crate::wallet_error;

/// Whether the session is waiting for the user to type a key to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionMode {
    #[default]
    Idle,
    AwaitingImportInput,
}

/// Key material and addresses of the active wallet.
#[derive(Debug)]
struct WalletIdentity {
    btc_address: String,
    eth_address: String,
    public_key: Option<String>,
    wif: Option<SecretString>,
    private_key: SecretString,
}

impl WalletIdentity {
    fn generated(response: GenerateWalletResponse) -> Self {
        Self {
            btc_address: response.btc_address,
            eth_address: response.eth_address,
            public_key: response.public_key,
            wif: Some(SecretString::from(response.wif)),
            private_key: SecretString::from(response.private_key),
        }
    }

    fn imported(response: ImportWalletResponse, private_key: &str) -> Self {
        Self {
            btc_address: response.btc_address,
            eth_address: response.eth_address,
            public_key: None,
            wif: response.wif.map(SecretString::from),
            private_key: SecretString::from(private_key.to_string()),
        }
    }

    fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            btc_address: self.btc_address.clone(),
            eth_address: self.eth_address.clone(),
            public_key: self.public_key.clone(),
            has_wif: self.wif.is_some(),
        }
    }
}

/// Public, secret-free view of the active wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySummary {
    pub btc_address: String,
    pub eth_address: String,
    pub public_key: Option<String>,
    pub has_wif: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<WalletIdentity>,
    mode: SessionMode,
    connected: bool,
    network_address: Option<String>,
    balance: Option<Balance>,
    pending: bool,
    last_error: Option<WalletError>,
}

impl SessionState {
    fn install_identity(&mut self, identity: WalletIdentity) {
        log::info!(
            "Wallet ready (eth {}, btc {})",
            identity.eth_address,
            identity.btc_address
        );
        self.identity = Some(identity);
        self.mode = SessionMode::Idle;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.as_ref().map(WalletIdentity::summary),
            mode: self.mode,
            connected: self.connected,
            network_address: self.network_address.clone(),
            balance: self.balance.clone(),
            pending: self.pending,
            last_error: self.last_error.clone(),
        }
    }
}

impl RequestState for SessionState {
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

/// Point-in-time copy of the observable session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<IdentitySummary>,
    pub mode: SessionMode,
    pub connected: bool,
    pub network_address: Option<String>,
    pub balance: Option<Balance>,
    pub pending: bool,
    pub last_error: Option<WalletError>,
}

/// Read-only access to the session for other components.
#[derive(Debug, Clone)]
pub struct SessionReader {
    state: Arc<RwLock<SessionState>>,
}

impl SessionReader {
    pub fn has_identity(&self) -> bool {
        self.state.read().identity.is_some()
    }

    /// Copy of the active private key, zeroized when dropped.
    pub fn private_key(&self) -> Option<Zeroizing<String>> {
        self.state
            .read()
            .identity
            .as_ref()
            .map(|identity| Zeroizing::new(identity.private_key.expose_secret().to_string()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().snapshot()
    }
}

/// Owns wallet identity, connectivity and balance, and serializes the
/// commands that change them against the wallet service.
///
/// At most one command request is outstanding at a time; anything invoked
/// meanwhile fails with [`WalletError::Busy`].
pub struct WalletSession {
    api: Arc<dyn WalletApi>,
    state: Arc<RwLock<SessionState>>,
    import_input: Mutex<Zeroizing<String>>,
    validator: InputValidator,
}

impl WalletSession {
    pub fn new(api: Arc<dyn WalletApi>) -> WalletResult<Self> {
        Ok(Self {
            api,
            state: Arc::new(RwLock::new(SessionState::default())),
            import_input: Mutex::new(Zeroizing::new(String::new())),
            validator: InputValidator::new()?,
        })
    }

    pub fn reader(&self) -> SessionReader {
        SessionReader {
            state: Arc::clone(&self.state),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().snapshot()
    }

    pub fn is_pending(&self) -> bool {
        self.state.read().pending
    }

    pub fn last_error(&self) -> Option<WalletError> {
        self.state.read().last_error.clone()
    }

    /// WIF of the active wallet, when the service provided one.
    pub fn reveal_wif(&self) -> Option<Zeroizing<String>> {
        self.state
            .read()
            .identity
            .as_ref()
            .and_then(|identity| identity.wif.as_ref())
            .map(|wif| Zeroizing::new(wif.expose_secret().to_string()))
    }

    /// Ask the service for a fresh key pair and make it the active wallet.
    pub async fn generate_wallet(&self) -> WalletResult<IdentitySummary> {
        let (flight, ()) = InFlight::start(&self.state, "generate_wallet", |_| Ok(()))?;
        let outcome = self.api.generate_wallet().await;
        flight.settle(outcome, |state, response| {
            let identity = WalletIdentity::generated(response);
            let summary = identity.summary();
            state.install_identity(identity);
            summary
        })
    }

    /// Switch to import mode. Returns `false` when a wallet is already active.
    pub fn enter_import_mode(&self) -> WalletResult<bool> {
        let mut state = self.state.write();
        reject_if_pending(&mut state)?;
        if state.identity.is_some() {
            return Ok(false);
        }

        state.mode = SessionMode::AwaitingImportInput;
        state.last_error = None;
        Ok(true)
    }

    /// Leave import mode, discarding the typed key. Returns `false` when not importing.
    pub fn cancel_import_mode(&self) -> WalletResult<bool> {
        let mut state = self.state.write();
        reject_if_pending(&mut state)?;
        if state.mode != SessionMode::AwaitingImportInput {
            return Ok(false);
        }

        state.mode = SessionMode::Idle;
        state.last_error = None;
        drop(state);

        self.clear_import_input();
        Ok(true)
    }

    /// Replace the key text typed so far. Ignored outside import mode.
    pub fn set_import_input(&self, text: &str) -> bool {
        if self.state.read().mode != SessionMode::AwaitingImportInput {
            return false;
        }

        let mut buffer = self.import_input.lock();
        buffer.zeroize();
        buffer.push_str(text);
        true
    }

    pub fn import_input(&self) -> Zeroizing<String> {
        Zeroizing::new(self.import_input.lock().as_str().to_string())
    }

    /// Import the key currently held in the import buffer.
    pub async fn import_from_input(&self) -> WalletResult<IdentitySummary> {
        let raw_key = self.import_input();
        self.import_wallet(&raw_key).await
    }

    /// Import an existing private key through the service.
    ///
    /// On failure the session stays in import mode so the key can be corrected.
    pub async fn import_wallet(&self, raw_key: &str) -> WalletResult<IdentitySummary> {
        let (flight, key) = InFlight::start(&self.state, "import_wallet", |state| {
            if state.mode != SessionMode::AwaitingImportInput {
                return Err(wallet_error!(
                    PreconditionError,
                    "Choose to import a wallet first"
                ));
            }
            let key = self.validator.validate_private_key(raw_key)?;
            Ok(Zeroizing::new(key.to_string()))
        })?;

        let outcome = self.api.import_wallet(key.as_str()).await;
        let summary = flight.settle(outcome, |state, response| {
            let identity = WalletIdentity::imported(response, key.as_str());
            let summary = identity.summary();
            state.install_identity(identity);
            summary
        })?;

        self.clear_import_input();
        Ok(summary)
    }

    /// Connect the service to the Ethereum network for the active wallet.
    pub async fn connect(&self) -> WalletResult<()> {
        let (flight, ()) = InFlight::start(&self.state, "connect", |state| {
            if state.identity.is_none() {
                return Err(wallet_error!(
                    PreconditionError,
                    "Please generate or import a wallet first"
                ));
            }
            Ok(())
        })?;

        let outcome = self.api.connect_ethereum().await;
        flight.settle(outcome, |state, response| {
            if let Some(message) = &response.message {
                log::info!("{}", message);
            }
            state.connected = true;
            state.network_address = response.address;
        })
    }

    /// Fetch the ETH balance of the active wallet.
    pub async fn refresh_balance(&self) -> WalletResult<Balance> {
        let (flight, address) = InFlight::start(&self.state, "refresh_balance", |state| {
            match (&state.identity, state.connected) {
                (Some(identity), true) => Ok(identity.eth_address.clone()),
                _ => Err(wallet_error!(PreconditionError, "Please connect to Ethereum first")),
            }
        })?;

        let outcome = self.api.get_balance(&address).await;
        flight.settle(outcome, |state, response| {
            let balance = Balance::new(response.balance, response.balance_wei);
            log::info!("Balance of {}: {}", address, balance.display_eth());
            state.balance = Some(balance.clone());
            balance
        })
    }

    fn clear_import_input(&self) {
        self.import_input.lock().zeroize();
    }
}

fn reject_if_pending(state: &mut SessionState) -> WalletResult<()> {
    if state.pending {
        state.last_error = Some(WalletError::Busy);
        return Err(WalletError::Busy);
    }
    Ok(())
}
