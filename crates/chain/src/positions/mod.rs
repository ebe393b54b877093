//! Position readers for the supported lending protocols.
//!
//! Every reader answers one question: what does `user`'s position look like
//! on this fork right now. Amounts are reported as decimal strings exactly
//! as the contracts return them, without price conversion.

mod aave;
mod compound;
mod curveusd;
mod fluid;
mod liquity;
mod liquity_v2;
mod maker;
mod morpho;

pub use aave::AaveV3Reader;
pub use compound::CompoundV3Reader;
pub use curveusd::CurveUsdReader;
pub use fluid::FluidReader;
pub use liquity::LiquityReader;
pub use liquity_v2::LiquityV2Reader;
pub use maker::MakerReader;
pub use morpho::MorphoBlueReader;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use forkooor_core::{ChainDetails, Protocol};
use serde::Serialize;

use crate::error::{ChainError, Result};
use crate::session::ForkSession;

/// Aave V3 style account summary (also Spark).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDataView {
    pub user: Address,
    pub pool: Address,
    pub total_collateral_base: String,
    pub total_debt_base: String,
    pub available_borrows_base: String,
    pub current_liquidation_threshold: String,
    pub ltv: String,
    pub health_factor: String,
}

/// Collateral balance in a Comet market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollateralBalance {
    pub symbol: String,
    pub asset: Address,
    pub balance: String,
}

/// Compound V3 position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CometView {
    pub user: Address,
    pub comet: Address,
    pub base_token: Address,
    pub supply_balance: String,
    pub borrow_balance: String,
    pub collaterals: Vec<CollateralBalance>,
}

/// Morpho Blue position in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphoView {
    pub user: Address,
    pub market_id: B256,
    pub supply_shares: String,
    pub borrow_shares: String,
    pub collateral: String,
}

/// Liquity trove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TroveView {
    pub user: Address,
    pub status: String,
    pub debt: String,
    pub coll: String,
    pub pending_lusd_debt_reward: String,
    pub pending_eth_reward: String,
}

/// Liquity V2 trove in one collateral branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TroveV2View {
    pub user: Address,
    pub trove_manager: Address,
    pub trove_id: String,
    pub status: String,
    pub entire_debt: String,
    pub entire_coll: String,
    pub accrued_interest: String,
    pub annual_interest_rate: String,
    pub last_interest_rate_adj_time: String,
}

/// CurveUSD loan in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveUsdView {
    pub user: Address,
    pub controller: Address,
    pub loan_exists: bool,
    pub collateral: String,
    /// crvUSD held in soft-liquidated bands
    pub stablecoin: String,
    pub debt: String,
    pub bands: String,
    pub health: String,
}

/// Maker vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakerView {
    pub user: Address,
    pub cdp_id: String,
    pub urn: Address,
    pub owner: Address,
    pub ilk: String,
    pub collateral: String,
    pub normalized_debt: String,
    pub rate: String,
    /// Normalized debt times the ilk rate, in DAI wad
    pub debt: String,
}

/// Fluid vault position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FluidView {
    pub user: Address,
    pub nft_id: String,
    pub vault: Address,
    pub owner: Address,
    pub is_liquidated: bool,
    pub is_supply_position: bool,
    pub tick: String,
    pub supply: String,
    pub borrow: String,
    pub dust_borrow: String,
}

/// Position of a user in one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "protocol", rename_all = "kebab-case")]
pub enum PositionView {
    AaveV3(AccountDataView),
    Spark(AccountDataView),
    CompoundV3(CometView),
    MorphoBlue(MorphoView),
    Liquity(TroveView),
    LiquityV2(TroveV2View),
    Curveusd(CurveUsdView),
    Maker(MakerView),
    Fluid(FluidView),
}

/// Reads a user's position from one protocol deployment.
#[async_trait]
pub trait PositionReader: Send + Sync {
    /// Protocol this reader serves.
    fn protocol(&self) -> Protocol;

    /// Read `user`'s position on the session's fork.
    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView>;
}

/// Build the reader for `protocol` on `chain`.
///
/// `market` selects the Comet (base symbol or address) for Compound V3, the
/// market id for Morpho Blue, the controller for CurveUSD and the collateral
/// branch for Liquity V2. Maker vaults, Liquity V2 troves and Fluid positions
/// are keyed by `position_id`.
pub fn reader_for(
    chain: &ChainDetails,
    protocol: Protocol,
    market: Option<&str>,
    position_id: Option<U256>,
) -> Result<Box<dyn PositionReader>> {
    let missing = |contract: &'static str| ChainError::MissingContract {
        chain_id: chain.chain_id,
        contract,
    };
    let unknown_market = |market: &str| ChainError::UnknownMarket {
        protocol,
        chain_id: chain.chain_id,
        market: market.to_string(),
    };

    let reader: Box<dyn PositionReader> = match protocol {
        Protocol::AaveV3 => {
            let pool = chain
                .contract(chain.contracts.aave_v3_pool.as_ref())
                .ok_or_else(|| missing("aave_v3_pool"))?;
            Box::new(AaveV3Reader::aave(pool))
        }
        Protocol::Spark => {
            let pool = chain
                .contract(chain.contracts.spark_pool.as_ref())
                .ok_or_else(|| missing("spark_pool"))?;
            Box::new(AaveV3Reader::spark(pool))
        }
        Protocol::CompoundV3 => {
            let name = market.unwrap_or("USDC");
            let comet = chain.comet(name).ok_or_else(|| unknown_market(name))?;
            let collaterals = comet
                .collaterals
                .iter()
                .map(|symbol| {
                    chain
                        .resolve_token(symbol)
                        .map(|token| (symbol.clone(), token.address))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Box::new(CompoundV3Reader::new(comet.address, collaterals))
        }
        Protocol::MorphoBlue => {
            let morpho = chain
                .contract(chain.contracts.morpho_blue.as_ref())
                .ok_or_else(|| missing("morpho_blue"))?;
            let id = market.unwrap_or_default();
            let market_id = id.parse::<B256>().map_err(|_| unknown_market(id))?;
            Box::new(MorphoBlueReader::new(morpho, market_id))
        }
        Protocol::Liquity => {
            let trove_manager = chain
                .contract(chain.contracts.liquity_trove_manager.as_ref())
                .ok_or_else(|| missing("liquity_trove_manager"))?;
            Box::new(LiquityReader::new(trove_manager))
        }
        Protocol::LiquityV2 => {
            let name = market.unwrap_or("WETH");
            let branch = chain
                .liquity_v2_branch(name)
                .ok_or_else(|| unknown_market(name))?;
            let trove_id = position_id.ok_or(ChainError::MissingPositionId(protocol))?;
            Box::new(LiquityV2Reader::new(branch.trove_manager, trove_id))
        }
        Protocol::Curveusd => {
            let name = market.unwrap_or_default();
            let controller = chain
                .crvusd_market(name)
                .ok_or_else(|| unknown_market(name))?;
            Box::new(CurveUsdReader::new(controller.controller))
        }
        Protocol::Maker => {
            let vat = chain
                .contract(chain.contracts.maker_vat.as_ref())
                .ok_or_else(|| missing("maker_vat"))?;
            let cdp_manager = chain
                .contract(chain.contracts.maker_cdp_manager.as_ref())
                .ok_or_else(|| missing("maker_cdp_manager"))?;
            let cdp_id = position_id.ok_or(ChainError::MissingPositionId(protocol))?;
            Box::new(MakerReader::new(vat, cdp_manager, cdp_id))
        }
        Protocol::Fluid => {
            let resolver = chain
                .contract(chain.contracts.fluid_vault_resolver.as_ref())
                .ok_or_else(|| missing("fluid_vault_resolver"))?;
            let nft_id = position_id.ok_or(ChainError::MissingPositionId(protocol))?;
            Box::new(FluidReader::new(resolver, nft_id))
        }
    };

    Ok(reader)
}
