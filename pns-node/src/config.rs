use serde::{Deserialize, Serialize};
use std::path::Path;

use pns_types::constants::*;
use pns_types::params::ProtocolParams;

use crate::error::NodeError;
use crate::format::parse_amount;

/// Name of the configuration file written by `pns init`.
pub const CONFIG_FILE: &str = "pns.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Storage backend: "memory", "sqlite", or "rocksdb"
    pub db_type: String,
}

/// Parameters handed to `deploy`. Ignored once a deployment exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub tld: String,
    pub min_commitment_age: u64,
    pub max_commitment_age: u64,
    pub min_registration_duration: u64,
    pub grace_period: u64,
    /// Per-day price in whole tokens for 1, 2, ... N+ character labels.
    pub prices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            tld: DEFAULT_TLD.to_string(),
            min_commitment_age: DEFAULT_MIN_COMMITMENT_AGE,
            max_commitment_age: DEFAULT_MAX_COMMITMENT_AGE,
            min_registration_duration: DEFAULT_MIN_REGISTRATION_DURATION,
            grace_period: DEFAULT_GRACE_PERIOD,
            prices: ["1", "0.5", "0.3", "0.1", "0.05"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProtocolConfig {
    /// Convert to deployable parameters, parsing the decimal prices.
    pub fn to_params(&self) -> Result<ProtocolParams, NodeError> {
        let price_tiers = self
            .prices
            .iter()
            .map(|p| parse_amount(p))
            .collect::<Result<Vec<_>, _>>()?;
        let params = ProtocolParams {
            tld: self.tld.clone(),
            min_commitment_age: self.min_commitment_age,
            max_commitment_age: self.max_commitment_age,
            min_registration_duration: self.min_registration_duration,
            grace_period: self.grace_period,
            price_tiers,
        };
        params.validate().map_err(|e| NodeError::ConfigError {
            reason: format!("invalid [protocol] section: {}", e),
        })?;
        Ok(params)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: dirs::home_dir()
                    .map(|h| h.join(".pns").join("data").to_string_lossy().into_owned())
                    .unwrap_or_else(|| "./pns-data".to_string()),
                db_type: "sqlite".to_string(),
            },
            protocol: ProtocolConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path, e),
        })?;
        let config: NodeConfig = toml::from_str(&contents).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to parse config file '{}': {}", path, e),
        })?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &str) -> Result<Self, NodeError> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write a default configuration file into `dir`, returning its path.
    ///
    /// An existing file is left alone.
    pub fn init(dir: &str) -> Result<String, NodeError> {
        let dir_path = Path::new(dir);
        if !dir_path.exists() {
            std::fs::create_dir_all(dir_path)?;
        }

        let config_path = dir_path.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(NodeError::ConfigError {
                reason: format!("'{}' already exists", config_path.display()),
            });
        }

        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to serialize default config: {}", e),
        })?;
        std::fs::write(&config_path, toml_str)?;

        Ok(config_path.to_string_lossy().into_owned())
    }
}
