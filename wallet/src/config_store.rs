use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use blake3::Hasher as Blake3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{WalletError, WalletResult};
use crate::storage::{write_atomic, WalletPaths};

const CONFIG_VERSION: u16 = 1;

pub const ENV_RPC_ENDPOINT: &str = "TIPJAR_RPC_ENDPOINT";
pub const ENV_RESCAN_DELAY_MS: &str = "TIPJAR_RESCAN_DELAY_MS";
pub const ENV_PERSIST_SESSION: &str = "TIPJAR_PERSIST_SESSION";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    /// Wait before the single re-scan that follows a submitted donation.
    pub rescan_delay_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rescan_delay_ms: 4_000,
        }
    }
}

impl ScanConfig {
    pub fn rescan_delay(&self) -> Duration {
        Duration::from_millis(self.rescan_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonationConfig {
    pub rpc: RpcConfig,
    pub scan: ScanConfig,
    pub persist_session: bool,
    pub environment: String,
    pub last_updated: DateTime<Utc>,
    pub version: u16,
}

impl DonationConfig {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            rpc: RpcConfig::default(),
            scan: ScanConfig::default(),
            persist_session: false,
            environment: environment.into(),
            last_updated: Utc::now(),
            version: CONFIG_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Apply `TIPJAR_*` environment variables on top of the stored values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Empty or unparsable values are logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in [ENV_RPC_ENDPOINT, ENV_RESCAN_DELAY_MS, ENV_PERSIST_SESSION] {
            let Some(value) = lookup(name) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                log::warn!("Environment variable {} is empty", name);
                continue;
            }
            if value.chars().any(|c| c.is_control()) {
                log::warn!(
                    "Environment variable {} contains control characters, ignoring",
                    name
                );
                continue;
            }

            let applied = match name {
                ENV_RPC_ENDPOINT => {
                    self.rpc.endpoint = value.to_string();
                    Ok(())
                }
                ENV_RESCAN_DELAY_MS => value
                    .parse::<u64>()
                    .map(|ms| self.scan.rescan_delay_ms = ms)
                    .map_err(|e| WalletError::ValidationError(e.to_string())),
                _ => parse_bool_flag(value, name).map(|flag| self.persist_session = flag),
            };

            match applied {
                Ok(()) => log::debug!("Loaded configuration from environment variable {}", name),
                Err(err) => log::warn!("Ignoring environment variable {}: {}", name, err),
            }
        }
    }
}

fn parse_bool_flag(value: &str, key: &str) -> WalletResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(WalletError::ValidationError(format!(
            "Invalid boolean value '{}' for key '{}'",
            value, key
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u16,
    checksum: [u8; 32],
    payload: DonationConfig,
    modified_at_unix: i64,
}

/// Handles persistence of donation configuration with integrity checks.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(paths: &WalletPaths) -> Self {
        Self {
            path: paths.config_file().to_path_buf(),
        }
    }

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_or_default(&self, environment: impl Into<String>) -> WalletResult<DonationConfig> {
        if !self.path.exists() {
            let config = DonationConfig::new(environment);
            self.save(&config)?;
            return Ok(config);
        }

        let bytes = fs::read(&self.path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != CONFIG_VERSION {
            return Err(WalletError::ValidationError(format!(
                "Unsupported config version {}",
                envelope.version
            )));
        }

        if checksum(&envelope.payload)? != envelope.checksum {
            return Err(WalletError::ValidationError(
                "Config integrity verification failed".to_string(),
            ));
        }

        Ok(envelope.payload)
    }

    pub fn save(&self, config: &DonationConfig) -> WalletResult<()> {
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

        write_atomic(&self.path, &serde_json::to_vec_pretty(&envelope)?)
    }

    pub fn update<F>(
        &self,
        environment: impl Into<String>,
        updater: F,
    ) -> WalletResult<DonationConfig>
    where
        F: FnOnce(&mut DonationConfig) -> WalletResult<()>,
    {
        let mut config = self.load_or_default(environment)?;
        updater(&mut config)?;
        config.touch();
        self.save(&config)?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(config: &DonationConfig) -> WalletResult<[u8; 32]> {
    let mut hasher = Blake3::new();
    hasher.update(&serde_json::to_vec(config)?);
    Ok(*hasher.finalize().as_bytes())
}
