//! Balance overrides through direct storage writes.
//!
//! Flow for a token balance:
//! 1. Resolve proxy tokens to the contract holding the mapping
//! 2. Look up the mapping slot in the storage slot table
//! 3. Derive the holder's storage key
//! 4. Write the value and mine a block
//! 5. Read `balanceOf` back; anything but the written amount is a failure

use alloy::primitives::{Address, B256, U256};
use forkooor_core::{balance_storage_key, units, StorageKey, StorageSlotTable};
use tracing::{info, instrument};

use crate::error::{ChainError, Result};
use crate::proxy_token::{self, TokenResolution};
use crate::session::ForkSession;
use crate::token;

/// One storage write: `value` at `key` on `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWriteRequest {
    /// Contract whose storage is written
    pub token: Address,
    /// Account whose balance the key points at
    pub holder: Address,
    pub key: StorageKey,
    /// Big-endian 32-byte amount
    pub value: B256,
}

/// Result of a verified balance override.
#[derive(Debug, Clone)]
pub struct BalanceOverride {
    pub resolution: TokenResolution,
    pub holder: Address,
    pub key: StorageKey,
    /// Raw balance read back after the write
    pub balance: U256,
}

/// Write one storage word and mine a block so it is visible to reads.
pub async fn write(session: &ForkSession, request: &StorageWriteRequest) -> Result<()> {
    session
        .set_storage_at(request.token, &request.key, request.value)
        .await?;
    session.mine().await
}

/// Build the write request for `holder`'s balance on `token`.
///
/// The slot table is consulted for the address the caller gave first, then
/// for the resolved storage contract.
pub fn write_request(
    table: &StorageSlotTable,
    chain_id: u64,
    resolution: &TokenResolution,
    holder: Address,
    amount: U256,
) -> Result<StorageWriteRequest> {
    let entry = match table.lookup(chain_id, resolution.original()) {
        Ok(entry) => entry,
        Err(e) if resolution.is_proxy() => table
            .lookup(chain_id, resolution.storage_address())
            .map_err(|_| e)?,
        Err(e) => return Err(e.into()),
    };

    Ok(StorageWriteRequest {
        token: resolution.storage_address(),
        holder,
        key: balance_storage_key(holder, entry),
        value: units::to_word(amount),
    })
}

/// Set `holder`'s balance of `token` to `amount` raw units and verify it.
#[instrument(skip(session, table), fields(url = %session.url()))]
pub async fn set_token_balance(
    session: &ForkSession,
    table: &StorageSlotTable,
    chain_id: u64,
    token: Address,
    holder: Address,
    amount: U256,
) -> Result<BalanceOverride> {
    let resolution = proxy_token::resolve(session, token).await;
    let request = write_request(table, chain_id, &resolution, holder, amount)?;

    write(session, &request).await?;

    let actual = token::balance_of(session, token, holder).await?;
    if actual != amount {
        return Err(ChainError::BalanceMismatch {
            token,
            holder,
            expected: amount,
            actual,
        });
    }

    info!(
        token = %token,
        storage = %request.token,
        holder = %holder,
        slot = %request.key,
        balance = %actual,
        "Token balance set"
    );

    Ok(BalanceOverride {
        resolution,
        holder,
        key: request.key,
        balance: actual,
    })
}

/// Set `holder`'s native balance to `amount` wei.
pub async fn set_eth_balance(session: &ForkSession, holder: Address, amount: U256) -> Result<()> {
    session.set_balance(holder, amount).await?;
    info!(holder = %holder, amount = %amount, "ETH balance set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{IProxyERC20, ISynth, IERC20};
    use crate::testing::{mock_call, mock_call_revert, mock_rpc, rpc_methods, rpc_params};
    use alloy::primitives::address;
    use alloy::sol_types::{SolCall, SolValue};
    use forkooor_core::{parse_amount, CoreError, ForkDialect, TokenSlotEntry};
    use wiremock::MockServer;

    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    const HOLDER: Address = address!("1111111111111111111111111111111111111111");
    const STATE: Address = address!("2222222222222222222222222222222222222222");

    fn table() -> StorageSlotTable {
        StorageSlotTable::from_entries([TokenSlotEntry {
            chain_id: 1,
            token: USDC,
            slot_index: 9,
            is_vyper: false,
        }])
        .unwrap()
    }

    async fn fork_with_balance(balance: U256) -> MockServer {
        let server = MockServer::start().await;
        mock_call_revert(&server, IProxyERC20::targetCall::SELECTOR).await;
        mock_rpc(&server, "tenderly_setStorageAt", serde_json::json!(null)).await;
        mock_rpc(&server, "evm_mine", serde_json::json!("0x0")).await;
        mock_call(&server, IERC20::balanceOfCall::SELECTOR, balance.abi_encode()).await;
        server
    }

    #[tokio::test]
    async fn test_set_usdc_balance_round_trip() {
        let amount = parse_amount("1000", 6).unwrap();
        assert_eq!(amount, U256::from(1_000_000_000u64));

        let server = fork_with_balance(amount).await;
        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();

        let result = set_token_balance(&session, &table(), 1, USDC, HOLDER, amount)
            .await
            .unwrap();

        assert_eq!(result.balance, amount);
        assert_eq!(result.resolution, TokenResolution::Direct(USDC));

        let writes = rpc_params(&server, "tenderly_setStorageAt").await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0], serde_json::json!(USDC));
        assert_eq!(writes[0][1], result.key.as_str());
        assert_eq!(
            writes[0][2],
            "0x000000000000000000000000000000000000000000000000000000003b9aca00"
        );

        let methods = rpc_methods(&server).await;
        let write_at = methods.iter().position(|m| m == "tenderly_setStorageAt");
        let mine_at = methods.iter().position(|m| m == "evm_mine");
        assert!(write_at < mine_at);
    }

    #[tokio::test]
    async fn test_mismatch_after_write_fails() {
        let server = fork_with_balance(U256::ZERO).await;
        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();

        let result = set_token_balance(&session, &table(), 1, USDC, HOLDER, U256::from(5)).await;
        assert!(matches!(
            result,
            Err(ChainError::BalanceMismatch { actual, .. }) if actual == U256::ZERO
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_fails_before_writing() {
        let server = fork_with_balance(U256::ZERO).await;
        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();

        let result = set_token_balance(&session, &table(), 8453, USDC, HOLDER, U256::from(5)).await;
        assert!(matches!(
            result,
            Err(ChainError::Core(CoreError::SlotNotFound { chain_id: 8453, .. }))
        ));
        assert!(rpc_params(&server, "tenderly_setStorageAt").await.is_empty());
    }

    #[tokio::test]
    async fn test_proxy_token_writes_state_contract() {
        let server = MockServer::start().await;
        mock_call(&server, IProxyERC20::targetCall::SELECTOR, address!("3333333333333333333333333333333333333333").abi_encode()).await;
        mock_call(&server, ISynth::tokenStateCall::SELECTOR, STATE.abi_encode()).await;
        mock_rpc(&server, "anvil_setStorageAt", serde_json::json!(true)).await;
        mock_rpc(&server, "evm_mine", serde_json::json!("0x0")).await;
        mock_call(&server, IERC20::balanceOfCall::SELECTOR, U256::from(7).abi_encode()).await;

        let session = ForkSession::bind(&server.uri(), ForkDialect::Anvil).unwrap();
        // Table lists the proxy address, write lands on the state contract
        let result = set_token_balance(&session, &table(), 1, USDC, HOLDER, U256::from(7))
            .await
            .unwrap();

        assert_eq!(result.resolution.storage_address(), STATE);
        let writes = rpc_params(&server, "anvil_setStorageAt").await;
        assert_eq!(writes[0][0], serde_json::json!(STATE));
    }

    #[test]
    fn test_write_request_falls_back_to_resolved_address() {
        let table = StorageSlotTable::from_entries([TokenSlotEntry {
            chain_id: 1,
            token: STATE,
            slot_index: 3,
            is_vyper: true,
        }])
        .unwrap();
        let resolution = TokenResolution::ProxyResolved {
            proxy: USDC,
            target: HOLDER,
            state: STATE,
        };

        let request = write_request(&table, 1, &resolution, HOLDER, U256::from(1)).unwrap();
        assert_eq!(request.token, STATE);
        assert_eq!(request.key, balance_storage_key(HOLDER, table.lookup(1, STATE).unwrap()));

        // A plain token never falls back
        assert!(write_request(&table, 1, &TokenResolution::Direct(USDC), HOLDER, U256::from(1)).is_err());
    }

    #[tokio::test]
    async fn test_set_eth_balance() {
        let server = MockServer::start().await;
        mock_rpc(&server, "tenderly_setBalance", serde_json::json!("0x1")).await;
        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();

        set_eth_balance(&session, HOLDER, U256::from(10u64.pow(18))).await.unwrap();

        let params = rpc_params(&server, "tenderly_setBalance").await;
        assert_eq!(params[0][1], "0xde0b6b3a7640000");
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_live_fork_usdc_balance() {
        let url = std::env::var("FORK_RPC_URL").expect("FORK_RPC_URL not set");
        let session = ForkSession::bind(&url, ForkDialect::Tenderly).unwrap();
        let amount = parse_amount("12345.67", 6).unwrap();

        let result = set_token_balance(&session, &table(), 1, USDC, HOLDER, amount)
            .await
            .unwrap();
        assert_eq!(result.balance, amount);
    }
}
