//! Forkooor core logic.
//!
//! This crate holds the chain-independent parts of the fork testing backend:
//! - Storage slot table for ERC-20 balance mappings
//! - Storage key derivation (Solidity and Vyper layouts)
//! - Decimal amount parsing and formatting
//! - Automation bundle table
//! - Service and chain configuration
//!
//! Nothing here talks to a node; see `forkooor-chain` for that.

pub mod bundles;
pub mod config;
mod error;
pub mod slots;
pub mod storage_key;
pub mod units;

pub use bundles::{BundleEntry, Operation, Protocol, StrategyTable};
pub use config::{
    load_from_env, ChainConfig, ChainContracts, ChainDetails, CometMarket, ConfigLoader,
    ConfigRegistry, CurveUsdMarket, ForkDialect, LiquityV2Branch, LoadedConfig, ServiceConfig,
    TenderlyConfig, TokenConfig, TokenRef,
};
pub use error::{CoreError, Result};
pub use slots::{StorageSlotTable, TokenSlotEntry};
pub use storage_key::{balance_storage_key, mapping_hash, StorageKey};
pub use units::{format_amount, parse_amount, validate_decimal};
