//! Tenderly REST client for resolving virtual testnet ids.

use anyhow::{anyhow, Context, Result};
use dashmap::DashMap;
use forkooor_core::TenderlyConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Name of the RPC endpoint that accepts debug methods.
const ADMIN_RPC: &str = "Admin RPC";

#[derive(Debug, Deserialize)]
struct VnetResponse {
    #[serde(default)]
    rpcs: Vec<VnetRpc>,
}

#[derive(Debug, Deserialize)]
struct VnetRpc {
    name: String,
    url: String,
}

/// Resolves vnet ids to RPC URLs, caching every answer for the process lifetime.
#[derive(Clone)]
pub struct TenderlyClient {
    client: reqwest::Client,
    config: TenderlyConfig,
    /// vnet id -> admin RPC URL
    cache: Arc<DashMap<String, String>>,
}

impl std::fmt::Debug for TenderlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenderlyClient")
            .field("api_url", &self.config.api_url)
            .field("account", &self.config.account)
            .field("project", &self.config.project)
            .field("cache_size", &self.cache.len())
            .finish()
    }
}

impl TenderlyClient {
    pub fn new(config: TenderlyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Admin RPC URL of a virtual testnet.
    #[instrument(skip(self))]
    pub async fn vnet_rpc_url(&self, vnet_id: &str) -> Result<String> {
        if let Some(url) = self.cache.get(vnet_id) {
            debug!(vnet_id, "Cache hit for vnet RPC");
            return Ok(url.clone());
        }

        let url = format!(
            "{}/account/{}/project/{}/vnets/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.account,
            self.config.project,
            vnet_id
        );

        let response = self
            .client
            .get(&url)
            .header("X-Access-Key", &self.config.access_key)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Failed to look up vnet {vnet_id}"))?;

        let vnet: VnetResponse = response.json().await?;
        let rpc = vnet
            .rpcs
            .iter()
            .find(|rpc| rpc.name == ADMIN_RPC)
            .or_else(|| vnet.rpcs.first())
            .ok_or_else(|| anyhow!("Vnet {vnet_id} has no RPC endpoints"))?;

        debug!(vnet_id, rpc = %rpc.name, "Resolved vnet RPC");
        self.cache.insert(vnet_id.to_string(), rpc.url.clone());
        Ok(rpc.url.clone())
    }
}
