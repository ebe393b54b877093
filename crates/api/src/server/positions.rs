//! Position routes, one per protocol.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use forkooor_chain::{reader_for, PositionView};
use forkooor_core::Protocol;

use super::error::ApiResult;
use super::requests::{PositionRequest, Validator};
use super::state::AppState;

async fn read_position(
    state: AppState,
    protocol: Protocol,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    let Json(req) = payload?;
    let mut v = Validator::default();
    let target = v.network(&req.network);
    let user = v.address("user", &req.user);
    let market = match protocol {
        Protocol::MorphoBlue | Protocol::Curveusd => v.required("market", &req.market).map(Some),
        _ => Some(req.market.as_deref()),
    };
    let position_id = match protocol {
        Protocol::Maker | Protocol::LiquityV2 | Protocol::Fluid => {
            v.uint256("positionId", &req.position_id).map(Some)
        }
        _ => Some(None),
    };
    let (Some(target), Some(user), Some(market), Some(position_id)) =
        (target, user, market, position_id)
    else {
        return Err(v.into_error());
    };

    let chain = state.chain(target.chain_id)?;
    let reader = reader_for(chain, protocol, market, position_id)?;
    let session = state.session(&target.selector).await?;
    Ok(Json(reader.position(&session, user).await?))
}

pub async fn aave_v3(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::AaveV3, payload).await
}

pub async fn spark(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::Spark, payload).await
}

pub async fn compound_v3(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::CompoundV3, payload).await
}

pub async fn morpho_blue(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::MorphoBlue, payload).await
}

pub async fn liquity(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::Liquity, payload).await
}

pub async fn liquity_v2(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::LiquityV2, payload).await
}

pub async fn curveusd(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::Curveusd, payload).await
}

pub async fn maker(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::Maker, payload).await
}

pub async fn fluid(
    State(state): State<AppState>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> ApiResult<PositionView> {
    read_position(state, Protocol::Fluid, payload).await
}
