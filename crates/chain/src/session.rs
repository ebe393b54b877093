//! Per-request binding to a fork or virtual network.
//!
//! A [`ForkSession`] is created at the start of each request and passed to
//! every operation that touches the network. Nothing is stored globally, so
//! concurrent requests against different forks never see each other's
//! endpoint.

use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use forkooor_core::{ForkDialect, StorageKey};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;
use url::Url;

use crate::error::{ChainError, Result};

/// How a request names the network it wants to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkSelector {
    /// Full RPC URL of a virtual testnet
    VnetUrl(String),
    /// Virtual testnet id, resolved through the Tenderly API
    VnetId(String),
    /// Legacy fork id, appended to the fork RPC base URL
    ForkId(String),
}

/// Active network binding for one logical request.
#[derive(Debug, Clone)]
pub struct ForkSession {
    url: Url,
    dialect: ForkDialect,
}

impl ForkSession {
    /// Bind to an RPC URL.
    pub fn bind(url: &str, dialect: ForkDialect) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| ChainError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(url = %url, ?dialect, "Bound fork session");
        Ok(Self { url, dialect })
    }

    /// Bind to a fork id under the fork RPC base URL.
    pub fn for_fork_id(fork_rpc_base: &str, fork_id: &str, dialect: ForkDialect) -> Result<Self> {
        Self::bind(&fork_url(fork_rpc_base, fork_id), dialect)
    }

    /// Endpoint this session talks to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Debug method family of the endpoint.
    pub fn dialect(&self) -> ForkDialect {
        self.dialect
    }

    /// Fresh HTTP provider for this session's endpoint.
    pub fn provider(&self) -> impl Provider + Clone {
        ProviderBuilder::new().on_http(self.url.clone())
    }

    /// Issue a raw JSON-RPC call against the session endpoint.
    pub(crate) async fn raw(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        debug!(url = %self.url, method, "RPC call");
        let provider = self.provider();
        let value = provider
            .raw_request::<_, serde_json::Value>(Cow::Borrowed(method), params)
            .await?;
        Ok(value)
    }

    /// Overwrite one storage word of a contract.
    ///
    /// The key is sent exactly as its string form, trimmed leading zeros included.
    pub async fn set_storage_at(&self, contract: Address, key: &StorageKey, value: B256) -> Result<()> {
        let method = match self.dialect {
            ForkDialect::Tenderly => "tenderly_setStorageAt",
            ForkDialect::Anvil => "anvil_setStorageAt",
        };
        self.raw(method, serde_json::json!([contract, key.as_str(), value]))
            .await?;
        Ok(())
    }

    /// Set the native balance of an account.
    pub async fn set_balance(&self, account: Address, amount: U256) -> Result<()> {
        let params = match self.dialect {
            ForkDialect::Tenderly => serde_json::json!([[account], amount]),
            ForkDialect::Anvil => serde_json::json!([account, amount]),
        };
        let method = match self.dialect {
            ForkDialect::Tenderly => "tenderly_setBalance",
            ForkDialect::Anvil => "anvil_setBalance",
        };
        self.raw(method, params).await?;
        Ok(())
    }

    /// Mine one block so pending state changes become visible.
    pub async fn mine(&self) -> Result<()> {
        self.raw("evm_mine", serde_json::json!([])).await?;
        Ok(())
    }

    /// Advance chain time and mine a block. Returns the new block timestamp.
    pub async fn increase_time(&self, seconds: u64) -> Result<u64> {
        self.raw("evm_increaseTime", serde_json::json!([quantity(seconds)]))
            .await?;
        self.mine().await?;
        self.latest_timestamp().await
    }

    /// Pin the next block's timestamp and mine it. Returns the new block timestamp.
    pub async fn set_next_timestamp(&self, timestamp: u64) -> Result<u64> {
        self.raw(
            "evm_setNextBlockTimestamp",
            serde_json::json!([quantity(timestamp)]),
        )
        .await?;
        self.mine().await?;
        self.latest_timestamp().await
    }

    /// Timestamp of the latest block.
    pub async fn latest_timestamp(&self) -> Result<u64> {
        let block = self
            .raw("eth_getBlockByNumber", serde_json::json!(["latest", false]))
            .await?;
        let timestamp = block
            .get("timestamp")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChainError::UnexpectedResponse("block without timestamp".into()))?;
        u64::from_str_radix(timestamp.trim_start_matches("0x"), 16)
            .map_err(|e| ChainError::UnexpectedResponse(format!("bad timestamp '{timestamp}': {e}")))
    }
}

/// URL of a fork under the fork RPC base.
pub fn fork_url(fork_rpc_base: &str, fork_id: &str) -> String {
    format!("{}/{}", fork_rpc_base.trim_end_matches('/'), fork_id)
}

fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_rpc, rpc_methods};
    use alloy::primitives::address;
    use wiremock::MockServer;

    #[test]
    fn test_fork_url() {
        assert_eq!(
            fork_url("https://rpc.tenderly.co/fork/", "abc-123"),
            "https://rpc.tenderly.co/fork/abc-123"
        );
        let session =
            ForkSession::for_fork_id("https://rpc.tenderly.co/fork", "abc", ForkDialect::Tenderly)
                .unwrap();
        assert_eq!(session.url().as_str(), "https://rpc.tenderly.co/fork/abc");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ForkSession::bind("not a url", ForkDialect::Tenderly),
            Err(ChainError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_dialect_method_names() {
        let server = MockServer::start().await;
        mock_rpc(&server, "tenderly_setBalance", serde_json::json!("0x1")).await;
        mock_rpc(&server, "anvil_setBalance", serde_json::json!(null)).await;

        let account = address!("1111111111111111111111111111111111111111");
        ForkSession::bind(&server.uri(), ForkDialect::Tenderly)
            .unwrap()
            .set_balance(account, U256::from(5))
            .await
            .unwrap();
        ForkSession::bind(&server.uri(), ForkDialect::Anvil)
            .unwrap()
            .set_balance(account, U256::from(5))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let bodies: Vec<serde_json::Value> = requests
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        // Tenderly takes an address array, anvil a single address
        assert!(bodies[0]["params"][0].is_array());
        assert!(bodies[1]["params"][0].is_string());
    }

    #[tokio::test]
    async fn test_increase_time_mines_and_reads_timestamp() {
        let server = MockServer::start().await;
        mock_rpc(&server, "evm_increaseTime", serde_json::json!("0x3c")).await;
        mock_rpc(&server, "evm_mine", serde_json::json!("0x0")).await;
        mock_rpc(
            &server,
            "eth_getBlockByNumber",
            serde_json::json!({ "number": "0x10", "timestamp": "0x6553f100" }),
        )
        .await;

        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();
        let timestamp = session.increase_time(60).await.unwrap();

        assert_eq!(timestamp, 0x6553f100);
        assert_eq!(
            rpc_methods(&server).await,
            vec!["evm_increaseTime", "evm_mine", "eth_getBlockByNumber"]
        );
    }

    #[tokio::test]
    async fn test_rpc_failure_propagates() {
        let server = MockServer::start().await;
        // Nothing mounted: every call gets a 404
        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();
        assert!(matches!(session.mine().await, Err(ChainError::Transport(_))));
    }

    #[tokio::test]
    async fn test_interleaved_sessions_keep_their_own_endpoint() {
        let server_a = MockServer::start().await;
        let server_b = MockServer::start().await;
        mock_rpc(&server_a, "eth_getBlockByNumber", serde_json::json!({ "timestamp": "0xa" })).await;
        mock_rpc(&server_b, "eth_getBlockByNumber", serde_json::json!({ "timestamp": "0xb" })).await;

        // Bind A, then bind B before A issues any call
        let session_a = ForkSession::bind(&server_a.uri(), ForkDialect::Tenderly).unwrap();
        let session_b = ForkSession::bind(&server_b.uri(), ForkDialect::Tenderly).unwrap();

        let (a, b) = tokio::join!(session_a.latest_timestamp(), session_b.latest_timestamp());
        assert_eq!(a.unwrap(), 0xa);
        assert_eq!(b.unwrap(), 0xb);

        assert_eq!(server_a.received_requests().await.unwrap().len(), 1);
        assert_eq!(server_b.received_requests().await.unwrap().len(), 1);
    }
}
