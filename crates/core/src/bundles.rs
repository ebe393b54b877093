//! Automation bundle lookup.
//!
//! One table keyed by `(protocol, chain_id, operation)` instead of chain-id
//! branches repeated at every call site. Loaded from TOML:
//!
//! ```toml
//! [[bundle]]
//! protocol = "aave-v3"
//! chain_id = 1
//! operation = "repay"
//! id = 8
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::{CoreError, Result};

/// Lending protocols with automation support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    AaveV3,
    CompoundV3,
    Spark,
    MorphoBlue,
    Liquity,
    LiquityV2,
    Curveusd,
    Maker,
    Fluid,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AaveV3 => "aave-v3",
            Self::CompoundV3 => "compound-v3",
            Self::Spark => "spark",
            Self::MorphoBlue => "morpho-blue",
            Self::Liquity => "liquity",
            Self::LiquityV2 => "liquity-v2",
            Self::Curveusd => "curveusd",
            Self::Maker => "maker",
            Self::Fluid => "fluid",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    /// Accepts the route spellings too (`aavev3`, `compoundV3`, `liquityV2`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "aave-v3" | "aavev3" => Ok(Self::AaveV3),
            "compound-v3" | "compoundv3" | "comet" => Ok(Self::CompoundV3),
            "spark" => Ok(Self::Spark),
            "morpho-blue" | "morphoblue" => Ok(Self::MorphoBlue),
            "liquity" => Ok(Self::Liquity),
            "liquity-v2" | "liquityv2" => Ok(Self::LiquityV2),
            "curveusd" | "crvusd" => Ok(Self::Curveusd),
            "maker" | "mcd" => Ok(Self::Maker),
            "fluid" => Ok(Self::Fluid),
            other => Err(format!("unknown protocol '{}'", other)),
        }
    }
}

/// Automated action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Repay,
    Boost,
    CloseOnPrice,
    TakeProfit,
    StopLoss,
    LeverageManagement,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repay => "repay",
            Self::Boost => "boost",
            Self::CloseOnPrice => "close-on-price",
            Self::TakeProfit => "take-profit",
            Self::StopLoss => "stop-loss",
            Self::LeverageManagement => "leverage-management",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "repay" => Ok(Self::Repay),
            "boost" => Ok(Self::Boost),
            "close-on-price" | "closeonprice" | "close" => Ok(Self::CloseOnPrice),
            "take-profit" | "takeprofit" => Ok(Self::TakeProfit),
            "stop-loss" | "stoploss" => Ok(Self::StopLoss),
            "leverage-management" | "leveragemanagement" => Ok(Self::LeverageManagement),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

/// Bundle table file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundlesConfig {
    #[serde(default)]
    pub bundle: Vec<BundleEntry>,
}

/// One `(protocol, chain, operation)` → bundle id row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub protocol: Protocol,
    pub chain_id: u64,
    pub operation: Operation,
    pub id: u64,
}

/// Strategy bundle lookup table.
#[derive(Debug, Default, Clone)]
pub struct StrategyTable {
    bundles: HashMap<(Protocol, u64, Operation), u64>,
}

impl StrategyTable {
    /// Build from rows, rejecting duplicate keys.
    pub fn from_entries(entries: impl IntoIterator<Item = BundleEntry>) -> Result<Self> {
        let mut bundles = HashMap::new();
        for e in entries {
            if bundles.insert((e.protocol, e.chain_id, e.operation), e.id).is_some() {
                return Err(CoreError::InvalidBundleTable(format!(
                    "duplicate bundle for {} {} on chain {}",
                    e.protocol, e.operation, e.chain_id
                )));
            }
        }
        Ok(Self { bundles })
    }

    /// Parse the TOML table.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BundlesConfig =
            toml::from_str(content).map_err(|e| CoreError::InvalidBundleTable(e.to_string()))?;
        Self::from_entries(config.bundle)
    }

    /// Load the TOML table from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidBundleTable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let table = Self::from_toml(&content)?;
        info!(file = %path.display(), bundles = table.len(), "Bundle table loaded");
        Ok(table)
    }

    /// Bundle id for an operation on a protocol and chain.
    pub fn bundle_id(&self, protocol: Protocol, chain_id: u64, operation: Operation) -> Result<u64> {
        self.bundles
            .get(&(protocol, chain_id, operation))
            .copied()
            .ok_or(CoreError::UnknownBundle {
                protocol,
                chain_id,
                operation,
            })
    }

    /// Operations available for a protocol on a chain.
    pub fn operations(&self, protocol: Protocol, chain_id: u64) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self
            .bundles
            .keys()
            .filter(|(p, c, _)| *p == protocol && *c == chain_id)
            .map(|(_, _, op)| *op)
            .collect();
        ops.sort_by_key(|op| op.as_str());
        ops
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
