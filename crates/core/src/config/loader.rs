//! Unified loader that ties together all configuration.
//!
//! A single entry point that reads the service config, the chain registry,
//! the storage slot table and the bundle table from one config directory.

use super::{ConfigRegistry, ServiceConfig};
use crate::bundles::StrategyTable;
use crate::slots::StorageSlotTable;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the service config file inside the config directory.
pub const SERVICE_CONFIG_FILE: &str = "forkooor.toml";

/// Everything the service needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Service settings
    pub service: ServiceConfig,
    /// Chain registry
    pub chains: ConfigRegistry,
    /// Balance mapping slots
    pub slots: StorageSlotTable,
    /// Automation bundle ids
    pub bundles: StrategyTable,
}

/// Loads configuration from a directory.
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for a config directory.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// Load everything. A missing service file falls back to defaults.
    pub fn load(&self) -> Result<LoadedConfig> {
        let service_path = self.config_dir.join(SERVICE_CONFIG_FILE);
        let service = if service_path.exists() {
            ServiceConfig::from_file(&service_path)
                .with_context(|| format!("Failed to load {:?}", service_path))?
        } else {
            info!(file = %service_path.display(), "No service config file, using defaults");
            ServiceConfig::default()
        };

        let chains = ConfigRegistry::load_from_dir(&self.config_dir)
            .context("Failed to load chain registry")?;

        let slots_path = self.config_dir.join(&service.data.storage_slots);
        let slots = StorageSlotTable::from_file(&slots_path)
            .with_context(|| format!("Failed to load storage slots from {:?}", slots_path))?;

        let bundles_path = self.config_dir.join(&service.data.bundles);
        let bundles = if bundles_path.exists() {
            StrategyTable::from_file(&bundles_path)
                .with_context(|| format!("Failed to load bundles from {:?}", bundles_path))?
        } else {
            tracing::warn!(file = %bundles_path.display(), "No bundle table, automation disabled");
            StrategyTable::default()
        };

        Ok(LoadedConfig {
            service,
            chains,
            slots,
            bundles,
        })
    }
}

/// Load configuration from `CONFIG_DIR` (default `./config`).
pub fn load_from_env() -> Result<LoadedConfig> {
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "./config".to_string());
    ConfigLoader::new(&config_dir).load()
}
