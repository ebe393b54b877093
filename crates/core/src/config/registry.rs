//! Configuration registry for loading and managing chain configs at runtime.

use super::{ChainConfig, ChainDetails};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::CoreError;

/// Chain configurations indexed by chain id.
#[derive(Debug, Default, Clone)]
pub struct ConfigRegistry {
    chains: HashMap<u64, ChainConfig>,
}

impl ConfigRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all chain configs from `<config_dir>/chains/*.toml`.
    pub fn load_from_dir(config_dir: impl AsRef<Path>) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        info!(config_dir = %config_dir.display(), "Loading configuration registry");

        let mut registry = Self::new();

        let chains_dir = config_dir.join("chains");
        if chains_dir.exists() {
            registry.load_chains(&chains_dir)?;
        }

        info!(chains = registry.chains.len(), "Configuration registry loaded");

        Ok(registry)
    }

    /// Load chain configs from a directory.
    fn load_chains(&mut self, dir: &Path) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|e| e == "toml") {
                let loaded = ChainConfig::from_file(&path).and_then(|mut config| {
                    config.expand_env_vars();
                    config.validate()?;
                    Ok(config)
                });

                match loaded {
                    Ok(config) => {
                        let chain_id = config.chain.chain_id;
                        debug!(
                            chain_id = chain_id,
                            name = %config.chain.name,
                            tokens = config.chain.tokens.len(),
                            file = %path.display(),
                            "Loaded chain config"
                        );
                        self.insert(config);
                    }
                    Err(e) => {
                        tracing::warn!(
                            file = %path.display(),
                            error = %e,
                            "Failed to load chain config"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Add or replace a chain config.
    pub fn insert(&mut self, config: ChainConfig) {
        self.chains.insert(config.chain.chain_id, config);
    }

    /// Get chain details by chain ID.
    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainDetails> {
        self.chains.get(&chain_id).map(|c| &c.chain)
    }

    /// Get chain details, failing with a typed error when absent.
    pub fn chain(&self, chain_id: u64) -> std::result::Result<&ChainDetails, CoreError> {
        self.get_chain(chain_id).ok_or(CoreError::UnknownChain(chain_id))
    }

    /// Get all chain IDs.
    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }
}
