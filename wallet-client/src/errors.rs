use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a [`WalletError`], used by front ends to pick presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Precondition,
    Busy,
    Domain,
    Transport,
    Config,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletError {
    // Local input errors, never sent to the service
    ValidationError(String),

    // Command not permitted in the current session state
    PreconditionError(String),

    // Another request is still outstanding on the same component
    Busy,

    // Service answered with `success: false`; message is server supplied
    DomainError(String),

    // Network or decoding failure; message is synthesized locally
    TransportError(String),

    // Configuration and persistence
    ConfigError(String),
    StorageError(String),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::ValidationError(_) => ErrorKind::Validation,
            WalletError::PreconditionError(_) => ErrorKind::Precondition,
            WalletError::Busy => ErrorKind::Busy,
            WalletError::DomainError(_) => ErrorKind::Domain,
            WalletError::TransportError(_) => ErrorKind::Transport,
            WalletError::ConfigError(_) => ErrorKind::Config,
            WalletError::StorageError(_) => ErrorKind::Storage,
        }
    }

    /// True when the failure happened before any request was issued.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Precondition | ErrorKind::Busy
        )
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::ValidationError(msg) => write!(f, "{}", msg),
            WalletError::PreconditionError(msg) => write!(f, "{}", msg),
            WalletError::Busy => write!(f, "Another request is still in progress"),
            WalletError::DomainError(msg) => write!(f, "{}", msg),
            WalletError::TransportError(msg) => write!(f, "Network error: {}", msg),
            WalletError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

// Helper macro for easy error creation
#[macro_export]
macro_rules! wallet_error {
    ($variant:ident, $msg:expr) => {
        $crate::errors::WalletError::$variant($msg.to_string())
    };
    ($variant:ident) => {
        $crate::errors::WalletError::$variant
    };
}

// Conversion helpers
impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::StorageError(error.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::ConfigError(format!("JSON error: {}", error))
    }
}
