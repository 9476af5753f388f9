use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use blake3::Hasher as Blake3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{WalletError, WalletResult};

const CONFIG_VERSION: u16 = 1;

pub const ENV_API_URL: &str = "WALLET_API_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "WALLET_API_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "WALLET_LOG_LEVEL";
pub const ENV_ENVIRONMENT: &str = "WALLET_ENV";

const MAX_TIMEOUT_SECS: u64 = 300;
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub log_level: String,
    pub environment: String,
    pub last_updated: DateTime<Utc>,
    pub version: u16,
}

impl ClientConfig {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            api: ApiConfig::default(),
            log_level: "info".to_string(),
            environment: environment.into(),
            last_updated: Utc::now(),
            version: CONFIG_VERSION,
        }
    }

    /// Defaults with `WALLET_*` environment overrides applied.
    pub fn from_env() -> WalletResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> WalletResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(ENV_ENVIRONMENT)
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "development".to_string());
        let mut config = Self::new(environment);
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `WALLET_*` overrides on top of the current values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> WalletResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            self.api.base_url = url;
        }

        if let Some(raw) = non_empty(lookup(ENV_API_TIMEOUT_SECS)) {
            self.api.request_timeout_secs = raw.parse().map_err(|_| {
                WalletError::ConfigError(format!(
                    "Invalid {} value '{}': expected whole seconds",
                    ENV_API_TIMEOUT_SECS, raw
                ))
            })?;
        }

        if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
            self.log_level = level.to_lowercase();
        }

        self.validate()
    }

    pub fn validate(&self) -> WalletResult<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WalletError::ConfigError(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == 0 || self.api.request_timeout_secs > MAX_TIMEOUT_SECS
        {
            return Err(WalletError::ConfigError(format!(
                "Request timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(WalletError::ConfigError(format!(
                "Unknown log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u16,
    checksum: [u8; 32],
    payload: ClientConfig,
    modified_at_unix: i64,
}

/// Handles persistence of client configuration with integrity checks.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_or_default(&self, environment: impl Into<String>) -> WalletResult<ClientConfig> {
        if !self.path.exists() {
            let config = ClientConfig::new(environment);
            self.save(&config)?;
            return Ok(config);
        }

        let bytes = fs::read(&self.path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != CONFIG_VERSION {
            return Err(WalletError::ConfigError(format!(
                "Unsupported config version {}",
                envelope.version
            )));
        }

        let checksum = checksum(&envelope.payload)?;
        if checksum != envelope.checksum {
            return Err(WalletError::ConfigError(
                "Config integrity verification failed".to_string(),
            ));
        }

        envelope.payload.validate()?;
        Ok(envelope.payload)
    }

    pub fn save(&self, config: &ClientConfig) -> WalletResult<()> {
        config.validate()?;
        let mut payload = config.clone();
        payload.touch();

        let envelope = ConfigEnvelope {
            version: CONFIG_VERSION,
            checksum: checksum(&payload)?,
            modified_at_unix: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map_err(|e| WalletError::StorageError(e.to_string()))?
                .as_secs() as i64,
            payload,
        };

        let serialized = serde_json::to_vec_pretty(&envelope)?;
        let tmp_path = self.path.with_extension("new");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        log::debug!("Saved client configuration to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(config: &ClientConfig) -> WalletResult<[u8; 32]> {
    let mut hasher = Blake3::new();
    let encoded = serde_json::to_vec(config)?;
    hasher.update(&encoded);
    let mut output = [0u8; 32];
    output.copy_from_slice(hasher.finalize().as_bytes());
    Ok(output)
}
