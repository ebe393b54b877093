//! Error types for fork interaction.

use alloy::primitives::{Address, TxHash, U256};
use alloy::transports::TransportError;
use forkooor_core::{CoreError, Protocol};
use thiserror::Error;

/// Errors raised while talking to a fork or virtual network.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Network URL did not parse.
    #[error("Invalid network url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// JSON-RPC request failed. Propagated verbatim, never retried.
    #[error("RPC error: {0}")]
    Transport(#[from] TransportError),

    /// Typed contract call failed (revert or decode error).
    #[error("Contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// Read-back after a storage write did not show the written balance.
    #[error("Balance of {holder} on {token} is {actual} after write, expected {expected}")]
    BalanceMismatch {
        token: Address,
        holder: Address,
        expected: U256,
        actual: U256,
    },

    /// Transaction was mined with a failed status.
    #[error("Transaction {0} reverted")]
    TransactionReverted(TxHash),

    /// Node returned no receipt for a submitted transaction.
    #[error("No receipt for transaction {0}")]
    MissingReceipt(TxHash),

    /// Contract address not configured for this chain.
    #[error("No {contract} contract configured for chain {chain_id}")]
    MissingContract {
        chain_id: u64,
        contract: &'static str,
    },

    /// Market name or id not known for this protocol.
    #[error("Unknown {protocol} market '{market}' on chain {chain_id}")]
    UnknownMarket {
        protocol: Protocol,
        chain_id: u64,
        market: String,
    },

    /// Protocol keys positions by id and none was given.
    #[error("{0} positions need a position id")]
    MissingPositionId(Protocol),

    /// Position id does not exist on the fork.
    #[error("No {protocol} position {id}")]
    PositionNotFound { protocol: Protocol, id: String },

    /// RPC answered with something we could not interpret.
    #[error("Unexpected RPC response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let error: ChainError = CoreError::UnknownChain(5).into();
        assert_eq!(error.to_string(), "Unknown chain id 5");
    }

    #[test]
    fn test_mismatch_display() {
        let error = ChainError::BalanceMismatch {
            token: Address::ZERO,
            holder: Address::ZERO,
            expected: U256::from(10),
            actual: U256::ZERO,
        };
        assert!(error.to_string().ends_with("is 0 after write, expected 10"));
    }
}
