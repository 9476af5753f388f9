// lib.rs - Core library structure for the wallet client

pub mod api;
pub mod app_state;
pub mod blockchain;
pub mod config_store;
pub mod errors;
mod inflight;
pub mod service_client;
pub mod session;
pub mod transfer;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use api::types::*;
pub use app_state::WalletContext;
pub use blockchain::{Balance, EthAmount};
pub use config_store::{ApiConfig, ClientConfig, ConfigStore};
pub use errors::{ErrorKind, WalletError, WalletResult};
pub use service_client::{WalletApi, WalletServiceClient};
pub use session::{IdentitySummary, SessionMode, SessionReader, SessionSnapshot, WalletSession};
pub use transfer::{TransferController, TransferSnapshot};
pub use validation::InputValidator;
