//! `/automation/*` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use forkooor_chain::{automation, AutomationContracts, SmartWallet, WalletType};
use forkooor_core::{Operation, Protocol};
use serde::Serialize;

use super::error::ApiResult;
use super::requests::{BundleRequest, SubscribeRequest, Validator, DEFAULT_CHAIN_ID};
use super::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    pub bundle_id: u64,
    /// Every operation with a bundle for this protocol and chain
    pub operations: Vec<Operation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub sub_id: String,
    pub bundle_id: u64,
    pub tx_hash: String,
}

pub async fn bundle(
    State(state): State<AppState>,
    payload: Result<Json<BundleRequest>, JsonRejection>,
) -> ApiResult<BundleResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let protocol = v.parsed::<Protocol>("protocol", &req.protocol);
    let operation = v.parsed::<Operation>("operation", &req.operation);
    let (Some(protocol), Some(operation)) = (protocol, operation) else {
        return Err(v.into_error());
    };

    let chain_id = req.chain_id.unwrap_or(DEFAULT_CHAIN_ID);
    let bundle_id = state
        .config()
        .bundles
        .bundle_id(protocol, chain_id, operation)?;
    let operations = state.config().bundles.operations(protocol, chain_id);
    Ok(Json(BundleResponse {
        bundle_id,
        operations,
    }))
}

pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<SubscribeResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let protocol = v.parsed::<Protocol>("protocol", &req.protocol);
    let operation = v.parsed::<Operation>("operation", &req.operation);
    let owner = v.address("owner", &req.owner);
    let wallet = v.address("wallet", &req.wallet);
    let wallet_type = v.parsed::<WalletType>("walletType", &req.wallet_type);
    let trigger_data = v.bytes_list("triggerData", &req.trigger_data);
    let sub_data = v.words_list("subData", &req.sub_data);
    let (
        Some(target),
        Some(protocol),
        Some(operation),
        Some(owner),
        Some(wallet),
        Some(wallet_type),
        Some(trigger_data),
        Some(sub_data),
    ) = (
        target,
        protocol,
        operation,
        owner,
        wallet,
        wallet_type,
        trigger_data,
        sub_data,
    )
    else {
        return Err(v.into_error());
    };

    let bundle_id = state
        .config()
        .bundles
        .bundle_id(protocol, target.chain_id, operation)?;
    let chain = state.chain(target.chain_id)?;
    let contracts = AutomationContracts::for_chain(chain)?;
    let session = state.session(&target.selector).await?;

    let subscription = automation::subscribe(
        &session,
        contracts,
        &SmartWallet::new(wallet, wallet_type),
        owner,
        bundle_id,
        trigger_data,
        sub_data,
    )
    .await?;

    Ok(Json(SubscribeResponse {
        sub_id: subscription.sub_id.to_string(),
        bundle_id,
        tx_hash: subscription.tx_hash.to_string(),
    }))
}
