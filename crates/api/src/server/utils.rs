//! `/utils/*` handlers: balances, approvals and chain time.

use alloy::primitives::U256;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::DateTime;
use forkooor_chain::{balance, token, ForkSession};
use forkooor_core::{format_amount, parse_amount, CoreError, TokenRef};
use serde::Serialize;
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::requests::{
    ApproveRequest, SetEthBalanceRequest, SetTimestampRequest, SetTokenBalanceRequest,
    TimeTravelRequest, TokenBalanceRequest, Validator,
};
use super::state::AppState;

const ETH_DECIMALS: u8 = 18;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceResponse {
    pub token: String,
    pub account: String,
    /// Human units
    pub balance: String,
    /// Raw integer units
    pub raw_balance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthBalanceResponse {
    pub account: String,
    pub balance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub tx_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampResponse {
    pub timestamp: u64,
    pub datetime: String,
}

impl From<u64> for TimestampResponse {
    fn from(timestamp: u64) -> Self {
        let datetime = i64::try_from(timestamp)
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();
        Self {
            timestamp,
            datetime,
        }
    }
}

/// Decimals from config, or from the token contract when unlisted.
async fn token_decimals(session: &ForkSession, token: &TokenRef) -> Result<u8, ApiError> {
    match token.decimals {
        Some(decimals) => Ok(decimals),
        None => Ok(token::decimals(session, token.address).await?),
    }
}

fn scale(amount: &str, decimals: u8) -> Result<U256, ApiError> {
    parse_amount(amount, decimals).map_err(|e| match e {
        CoreError::UnsupportedDecimals(_) => e.into(),
        _ => ApiError::field("amount", e.to_string()),
    })
}

/// Scale up front when decimals are listed, so a bad amount never opens a session.
fn scale_listed(amount: &str, token: &TokenRef) -> Result<Option<U256>, ApiError> {
    token.decimals.map(|d| scale(amount, d)).transpose()
}

pub async fn set_token_balance(
    State(state): State<AppState>,
    payload: Result<Json<SetTokenBalanceRequest>, JsonRejection>,
) -> ApiResult<TokenBalanceResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let token = v.required("token", &req.token);
    let account = v.address("account", &req.account);
    let amount = v.amount("amount", &req.amount);
    let (Some(target), Some(token), Some(account), Some(amount)) = (target, token, account, amount)
    else {
        return Err(v.into_error());
    };

    let chain = state.chain(target.chain_id)?;
    let token = chain.resolve_token(token)?;
    let listed = scale_listed(&amount, &token)?;
    let session = state.session(&target.selector).await?;
    let decimals = token_decimals(&session, &token).await?;
    let raw = match listed {
        Some(raw) => raw,
        None => scale(&amount, decimals)?,
    };

    let result = balance::set_token_balance(
        &session,
        &state.config().slots,
        target.chain_id,
        token.address,
        account,
        raw,
    )
    .await?;

    info!(token = %token.address, account = %account, amount = %amount, "set-token-balance");

    Ok(Json(TokenBalanceResponse {
        token: token.address.to_string(),
        account: account.to_string(),
        balance: format_amount(result.balance, decimals)?,
        raw_balance: result.balance.to_string(),
    }))
}

pub async fn set_eth_balance(
    State(state): State<AppState>,
    payload: Result<Json<SetEthBalanceRequest>, JsonRejection>,
) -> ApiResult<EthBalanceResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let account = v.address("account", &req.account);
    let amount = v.amount("amount", &req.amount);
    let (Some(target), Some(account), Some(amount)) = (target, account, amount) else {
        return Err(v.into_error());
    };

    let wei = scale(&amount, ETH_DECIMALS)?;
    let session = state.session(&target.selector).await?;
    balance::set_eth_balance(&session, account, wei).await?;

    Ok(Json(EthBalanceResponse {
        account: account.to_string(),
        balance: format_amount(wei, ETH_DECIMALS)?,
    }))
}

pub async fn token_balance(
    State(state): State<AppState>,
    payload: Result<Json<TokenBalanceRequest>, JsonRejection>,
) -> ApiResult<TokenBalanceResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let token = v.required("token", &req.token);
    let account = v.address("account", &req.account);
    let (Some(target), Some(token), Some(account)) = (target, token, account) else {
        return Err(v.into_error());
    };

    let chain = state.chain(target.chain_id)?;
    let token = chain.resolve_token(token)?;
    let session = state.session(&target.selector).await?;
    let decimals = token_decimals(&session, &token).await?;
    let raw = token::balance_of(&session, token.address, account).await?;

    Ok(Json(TokenBalanceResponse {
        token: token.address.to_string(),
        account: account.to_string(),
        balance: format_amount(raw, decimals)?,
        raw_balance: raw.to_string(),
    }))
}

pub async fn approve(
    State(state): State<AppState>,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> ApiResult<TxResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let token = v.required("token", &req.token);
    let owner = v.address("owner", &req.owner);
    let spender = v.address("spender", &req.spender);
    // "max" approves the full uint256 range
    let is_max = matches!(&req.amount, Some(serde_json::Value::String(s)) if s.eq_ignore_ascii_case("max"));
    let amount = if is_max { Some(String::new()) } else { v.amount("amount", &req.amount) };
    let (Some(target), Some(token), Some(owner), Some(spender), Some(amount)) =
        (target, token, owner, spender, amount)
    else {
        return Err(v.into_error());
    };

    let chain = state.chain(target.chain_id)?;
    let token = chain.resolve_token(token)?;
    let listed = if is_max { Some(U256::MAX) } else { scale_listed(&amount, &token)? };
    let session = state.session(&target.selector).await?;
    let raw = match listed {
        Some(raw) => raw,
        None => scale(&amount, token_decimals(&session, &token).await?)?,
    };

    let hash = token::approve(&session, token.address, owner, spender, raw).await?;
    Ok(Json(TxResponse {
        tx_hash: hash.to_string(),
    }))
}

pub async fn time_travel(
    State(state): State<AppState>,
    payload: Result<Json<TimeTravelRequest>, JsonRejection>,
) -> ApiResult<TimestampResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let seconds = v.integer("seconds", &req.seconds);
    let (Some(target), Some(seconds)) = (target, seconds) else {
        return Err(v.into_error());
    };

    let session = state.session(&target.selector).await?;
    let timestamp = session.increase_time(seconds).await?;
    info!(seconds, timestamp, "time-travel");
    Ok(Json(timestamp.into()))
}

pub async fn set_timestamp(
    State(state): State<AppState>,
    payload: Result<Json<SetTimestampRequest>, JsonRejection>,
) -> ApiResult<TimestampResponse> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let timestamp = v.integer("timestamp", &req.timestamp);
    let (Some(target), Some(timestamp)) = (target, timestamp) else {
        return Err(v.into_error());
    };

    let session = state.session(&target.selector).await?;
    let timestamp = session.set_next_timestamp(timestamp).await?;
    Ok(Json(timestamp.into()))
}
