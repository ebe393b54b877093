//! Per-chain configuration: tokens and protocol contract addresses.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::expand_env;
use crate::error::{CoreError, Result};

/// Chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain details
    pub chain: ChainDetails,
}

/// Chain details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDetails {
    /// Chain ID
    pub chain_id: u64,
    /// Human-readable name
    pub name: String,
    /// Known tokens
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    /// Protocol contract addresses
    #[serde(default)]
    pub contracts: ChainContracts,
    /// Compound V3 markets
    #[serde(default)]
    pub comets: Vec<CometMarket>,
    /// CurveUSD lending markets
    #[serde(default)]
    pub crvusd_markets: Vec<CurveUsdMarket>,
    /// Liquity V2 collateral branches
    #[serde(default)]
    pub liquity_v2_branches: Vec<LiquityV2Branch>,
}

/// Token listed for a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

/// Protocol contract addresses. All optional: a chain lists what it has.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainContracts {
    #[serde(default)]
    pub aave_v3_pool: Option<String>,
    #[serde(default)]
    pub spark_pool: Option<String>,
    #[serde(default)]
    pub morpho_blue: Option<String>,
    #[serde(default)]
    pub liquity_trove_manager: Option<String>,
    #[serde(default)]
    pub maker_vat: Option<String>,
    #[serde(default)]
    pub maker_cdp_manager: Option<String>,
    #[serde(default)]
    pub fluid_vault_resolver: Option<String>,
    /// Automation subscription entry point
    #[serde(default)]
    pub sub_proxy: Option<String>,
    /// Automation subscription storage
    #[serde(default)]
    pub sub_storage: Option<String>,
}

/// A Compound V3 (Comet) market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CometMarket {
    /// Base asset symbol used as the market name (e.g. "USDC")
    pub market: String,
    /// Comet proxy address
    pub address: Address,
    /// Collateral token symbols to report
    #[serde(default)]
    pub collaterals: Vec<String>,
}

/// A CurveUSD market, named by its collateral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveUsdMarket {
    pub market: String,
    pub controller: Address,
}

/// A Liquity V2 branch, named by its collateral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquityV2Branch {
    pub market: String,
    pub trove_manager: Address,
}

impl ChainContracts {
    fn entries_mut(&mut self) -> [(&'static str, &mut Option<String>); 9] {
        [
            ("aave_v3_pool", &mut self.aave_v3_pool),
            ("spark_pool", &mut self.spark_pool),
            ("morpho_blue", &mut self.morpho_blue),
            ("liquity_trove_manager", &mut self.liquity_trove_manager),
            ("maker_vat", &mut self.maker_vat),
            ("maker_cdp_manager", &mut self.maker_cdp_manager),
            ("fluid_vault_resolver", &mut self.fluid_vault_resolver),
            ("sub_proxy", &mut self.sub_proxy),
            ("sub_storage", &mut self.sub_storage),
        ]
    }
}

/// A token resolved from a symbol or address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub address: Address,
    /// Known when the token is listed; otherwise read on chain
    pub decimals: Option<u8>,
    pub symbol: Option<String>,
}

impl ChainDetails {
    /// Resolve a token given as a listed symbol (case-insensitive) or as an address.
    ///
    /// Unlisted addresses are accepted without decimals.
    pub fn resolve_token(&self, token: &str) -> Result<TokenRef> {
        if let Ok(address) = token.parse::<Address>() {
            let listed = self.tokens.iter().find(|t| t.address == address);
            return Ok(TokenRef {
                address,
                decimals: listed.map(|t| t.decimals),
                symbol: listed.map(|t| t.symbol.clone()),
            });
        }

        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(token))
            .map(|t| TokenRef {
                address: t.address,
                decimals: Some(t.decimals),
                symbol: Some(t.symbol.clone()),
            })
            .ok_or_else(|| CoreError::UnknownToken {
                chain_id: self.chain_id,
                token: token.to_string(),
            })
    }

    /// Find a Comet market by base symbol or proxy address.
    pub fn comet(&self, market: &str) -> Option<&CometMarket> {
        let by_address = market.parse::<Address>().ok();
        self.comets.iter().find(|c| {
            c.market.eq_ignore_ascii_case(market) || Some(c.address) == by_address
        })
    }

    /// Find a CurveUSD market by collateral symbol or controller address.
    pub fn crvusd_market(&self, market: &str) -> Option<&CurveUsdMarket> {
        let by_address = market.parse::<Address>().ok();
        self.crvusd_markets.iter().find(|m| {
            m.market.eq_ignore_ascii_case(market) || Some(m.controller) == by_address
        })
    }

    /// Find a Liquity V2 branch by collateral symbol or trove manager address.
    pub fn liquity_v2_branch(&self, market: &str) -> Option<&LiquityV2Branch> {
        let by_address = market.parse::<Address>().ok();
        self.liquity_v2_branches.iter().find(|b| {
            b.market.eq_ignore_ascii_case(market) || Some(b.trove_manager) == by_address
        })
    }

    /// Address of an optional contract entry.
    ///
    /// Entries are checked by [`ChainConfig::validate`] when loaded, so an
    /// entry that does not parse here was inserted unvalidated.
    pub fn contract(&self, value: Option<&String>) -> Option<Address> {
        value.and_then(|s| s.parse().ok())
    }
}

impl ChainConfig {
    /// Load chain config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ChainConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Expand environment variables in contract entries.
    pub fn expand_env_vars(&mut self) {
        for (_, entry) in self.chain.contracts.entries_mut() {
            if let Some(value) = entry {
                *value = expand_env(value);
            }
        }
    }

    /// Check contract entries after env expansion.
    ///
    /// Placeholders left unexpanded (variable not set) and empty entries are
    /// dropped; anything else must parse as an address.
    pub fn validate(&mut self) -> Result<()> {
        let chain_id = self.chain.chain_id;
        for (contract, entry) in self.chain.contracts.entries_mut() {
            let Some(value) = entry.as_deref() else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() || value.contains("${") {
                debug!(chain_id, contract, value, "Contract not configured");
                *entry = None;
                continue;
            }
            if value.parse::<Address>().is_err() {
                return Err(CoreError::InvalidContractAddress {
                    chain_id,
                    contract,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
