//! Shared, read-only state handed to every handler.

use forkooor_chain::{ForkSession, NetworkSelector};
use forkooor_core::{ChainDetails, LoadedConfig};
use std::sync::Arc;

use super::error::ApiError;
use crate::tenderly::TenderlyClient;

/// Loaded configuration plus the Tenderly client. Holds no network binding.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<LoadedConfig>,
    tenderly: Option<TenderlyClient>,
}

impl AppState {
    pub fn new(config: LoadedConfig) -> Self {
        let tenderly = config.service.tenderly.clone().map(TenderlyClient::new);
        Self {
            config: Arc::new(config),
            tenderly,
        }
    }

    pub fn config(&self) -> &LoadedConfig {
        &self.config
    }

    /// Chain configuration, failing for unknown chain ids.
    pub fn chain(&self, chain_id: u64) -> Result<&ChainDetails, ApiError> {
        Ok(self.config.chains.chain(chain_id)?)
    }

    /// Open a session on the network a request selected.
    pub async fn session(&self, selector: &NetworkSelector) -> Result<ForkSession, ApiError> {
        let network = &self.config.service.network;
        let session = match selector {
            NetworkSelector::VnetUrl(url) => ForkSession::bind(url, network.dialect)?,
            NetworkSelector::ForkId(id) => {
                ForkSession::for_fork_id(&network.fork_rpc_base, id, network.dialect)?
            }
            NetworkSelector::VnetId(id) => {
                let tenderly = self.tenderly.as_ref().ok_or_else(|| {
                    ApiError::Internal("vnetId requires a [tenderly] section in the service config".into())
                })?;
                let url = tenderly.vnet_rpc_url(id).await?;
                ForkSession::bind(&url, network.dialect)?
            }
        };
        Ok(session)
    }
}
