//! Error types for the core crate.

use alloy::primitives::Address;
use thiserror::Error;

use crate::bundles::{Operation, Protocol};

/// Errors raised by lookups and parsing in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No storage slot entry for this token on this chain.
    #[error("No storage slot entry for token {token} on chain {chain_id}")]
    SlotNotFound { chain_id: u64, token: Address },

    /// Slot table file is malformed or contains duplicates.
    #[error("Invalid storage slot table: {0}")]
    InvalidSlotTable(String),

    /// No bundle id for this (protocol, chain, operation) triple.
    #[error("No bundle for {protocol} {operation} on chain {chain_id}")]
    UnknownBundle {
        protocol: Protocol,
        chain_id: u64,
        operation: Operation,
    },

    /// Bundle table file is malformed or contains duplicates.
    #[error("Invalid bundle table: {0}")]
    InvalidBundleTable(String),

    /// Token symbol or address not known on this chain.
    #[error("Unknown token '{token}' on chain {chain_id}")]
    UnknownToken { chain_id: u64, token: String },

    /// Chain id has no configuration.
    #[error("Unknown chain id {0}")]
    UnknownChain(u64),

    /// Human-readable amount could not be parsed.
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    /// Amount does not fit in 256 bits once scaled.
    #[error("Amount '{0}' overflows uint256")]
    AmountOverflow(String),

    /// Token decimals beyond what a uint256 can scale (max 77).
    #[error("Unsupported token decimals {0}")]
    UnsupportedDecimals(u8),

    /// Contract entry in a chain config is not an address.
    #[error("Invalid {contract} address '{value}' for chain {chain_id}")]
    InvalidContractAddress {
        chain_id: u64,
        contract: &'static str,
        value: String,
    },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
