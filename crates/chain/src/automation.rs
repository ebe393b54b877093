//! Automation strategy subscriptions.
//!
//! A subscription is recorded by delegate-calling the SubProxy from the
//! position's smart wallet. Trigger and sub data arrive already encoded;
//! this module only wraps them into a `StrategySub` and reads back the id
//! the SubStorage assigned.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::SolCall;
use forkooor_core::ChainDetails;
use serde::Serialize;
use tracing::info;

use crate::contracts::{ISubProxy, ISubStorage, StrategySub};
use crate::error::{ChainError, Result};
use crate::session::ForkSession;
use crate::wallet::SmartWallet;

/// A recorded subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub sub_id: U256,
    pub bundle_id: u64,
    pub tx_hash: TxHash,
}

/// Automation contracts of a chain.
#[derive(Debug, Clone, Copy)]
pub struct AutomationContracts {
    pub sub_proxy: Address,
    pub sub_storage: Address,
}

impl AutomationContracts {
    /// Read the automation addresses from chain config.
    pub fn for_chain(chain: &ChainDetails) -> Result<Self> {
        let sub_proxy = chain
            .contract(chain.contracts.sub_proxy.as_ref())
            .ok_or(ChainError::MissingContract {
                chain_id: chain.chain_id,
                contract: "sub_proxy",
            })?;
        let sub_storage = chain
            .contract(chain.contracts.sub_storage.as_ref())
            .ok_or(ChainError::MissingContract {
                chain_id: chain.chain_id,
                contract: "sub_storage",
            })?;
        Ok(Self {
            sub_proxy,
            sub_storage,
        })
    }
}

/// Calldata for `SubProxy.subscribeToStrategy` with a bundle id.
pub fn encode_subscribe(bundle_id: u64, trigger_data: Vec<Bytes>, sub_data: Vec<B256>) -> Bytes {
    ISubProxy::subscribeToStrategyCall {
        _sub: StrategySub {
            strategyOrBundleId: bundle_id,
            isBundle: true,
            triggerData: trigger_data,
            subData: sub_data,
        },
    }
    .abi_encode()
    .into()
}

/// Subscribe `wallet` to `bundle_id` and return the new subscription id.
pub async fn subscribe(
    session: &ForkSession,
    contracts: AutomationContracts,
    wallet: &SmartWallet,
    owner: Address,
    bundle_id: u64,
    trigger_data: Vec<Bytes>,
    sub_data: Vec<B256>,
) -> Result<Subscription> {
    let calldata = encode_subscribe(bundle_id, trigger_data, sub_data);
    let tx_hash = wallet
        .execute(session, owner, contracts.sub_proxy, calldata)
        .await?;

    let provider = session.provider();
    let count = ISubStorage::new(contracts.sub_storage, &provider)
        .getSubsCount()
        .call()
        .await?
        ._0;
    let sub_id = count
        .checked_sub(U256::from(1))
        .ok_or_else(|| ChainError::UnexpectedResponse("no subscriptions after subscribing".into()))?;

    info!(wallet = %wallet.address, bundle_id, sub_id = %sub_id, tx = %tx_hash, "Subscribed to strategy");

    Ok(Subscription {
        sub_id,
        bundle_id,
        tx_hash,
    })
}
