//! Service configuration.
//!
//! Loaded from `config/forkooor.toml`. Every string value may reference an
//! environment variable as `${VAR}`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::expand_env;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Fork / virtual network settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Tenderly REST API credentials (needed only for `vnetId` selectors)
    #[serde(default)]
    pub tenderly: Option<TenderlyConfig>,

    /// Static data files
    #[serde(default)]
    pub data: DataConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Which non-standard RPC method family the fork provider speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkDialect {
    /// Tenderly forks and virtual testnets (`tenderly_*`, `evm_*`)
    #[default]
    Tenderly,
    /// Anvil / Hardhat style nodes (`anvil_*`, `evm_*`)
    Anvil,
}

/// Fork / virtual network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Debug method dialect
    #[serde(default)]
    pub dialect: ForkDialect,

    /// Base URL that fork ids are appended to
    #[serde(default = "default_fork_rpc_base")]
    pub fork_rpc_base: String,
}

fn default_fork_rpc_base() -> String {
    "https://rpc.tenderly.co/fork".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            dialect: ForkDialect::default(),
            fork_rpc_base: default_fork_rpc_base(),
        }
    }
}

/// Tenderly REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderlyConfig {
    /// API base URL
    #[serde(default = "default_tenderly_api")]
    pub api_url: String,
    /// Account slug
    pub account: String,
    /// Project slug
    pub project: String,
    /// Access key (usually `${TENDERLY_ACCESS_KEY}`)
    pub access_key: String,
}

fn default_tenderly_api() -> String {
    "https://api.tenderly.co/api/v1".to_string()
}

/// Static data file locations, relative to the config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Storage slot table (JSON)
    #[serde(default = "default_storage_slots")]
    pub storage_slots: PathBuf,
    /// Automation bundle table (TOML)
    #[serde(default = "default_bundles")]
    pub bundles: PathBuf,
}

fn default_storage_slots() -> PathBuf {
    PathBuf::from("storage_slots.json")
}

fn default_bundles() -> PathBuf {
    PathBuf::from("bundles.toml")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            storage_slots: default_storage_slots(),
            bundles: default_bundles(),
        }
    }
}

impl ServiceConfig {
    /// Load service config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: ServiceConfig = toml::from_str(&content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Expand environment variables in config values.
    pub fn expand_env_vars(&mut self) {
        self.server.bind = expand_env(&self.server.bind);
        self.network.fork_rpc_base = expand_env(&self.network.fork_rpc_base);
        if let Some(ref mut tenderly) = self.tenderly {
            tenderly.api_url = expand_env(&tenderly.api_url);
            tenderly.account = expand_env(&tenderly.account);
            tenderly.project = expand_env(&tenderly.project);
            tenderly.access_key = expand_env(&tenderly.access_key);
        }
    }

    /// Log the loaded configuration (secrets omitted).
    pub fn log_config(&self) {
        tracing::info!(bind = %self.server.bind, "Server configuration loaded");
        tracing::info!(
            dialect = ?self.network.dialect,
            fork_rpc_base = %self.network.fork_rpc_base,
            tenderly_api = self.tenderly.is_some(),
            "Network configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.network.dialect, ForkDialect::Tenderly);
        assert!(config.tenderly.is_none());
        assert_eq!(config.data.storage_slots, PathBuf::from("storage_slots.json"));
    }

    #[test]
    fn test_parse_full_config() {
        std::env::set_var("SERVICE_TEST_TENDERLY_KEY", "secret");
        let toml_str = r#"
            [server]
            bind = "127.0.0.1:8080"

            [network]
            dialect = "anvil"

            [tenderly]
            account = "me"
            project = "forks"
            access_key = "${SERVICE_TEST_TENDERLY_KEY}"
        "#;

        let mut config: ServiceConfig = toml::from_str(toml_str).unwrap();
        config.expand_env_vars();

        assert_eq!(config.network.dialect, ForkDialect::Anvil);
        let tenderly = config.tenderly.unwrap();
        assert_eq!(tenderly.access_key, "secret");
        assert_eq!(tenderly.api_url, "https://api.tenderly.co/api/v1");
        std::env::remove_var("SERVICE_TEST_TENDERLY_KEY");
    }
}
