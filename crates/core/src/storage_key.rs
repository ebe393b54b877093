//! Storage key derivation for `balanceOf` mapping entries.
//!
//! Solidity stores `mapping(address => uint256)` at slot `p` under
//! `keccak256(abi.encode(key, p))`; Vyper hashes the slot first,
//! `keccak256(abi.encode(p, key))`.
//!
//! The key handed to the fork's storage-write method is the hex rendering of
//! the hash with every leading zero nibble stripped one at a time
//! (`0x00ab..` -> `0x0ab..` -> `0xab..`). The slot table was mapped against
//! exactly this string form, so it is kept as-is.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use std::fmt;

use crate::slots::TokenSlotEntry;

/// Storage key for a holder's balance, in the string form sent over RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    raw: B256,
    trimmed: String,
}

impl StorageKey {
    /// Apply the leading-zero trim to a raw hash.
    pub fn from_hash(raw: B256) -> Self {
        let mut trimmed = format!("0x{}", hex::encode(raw));
        while trimmed.starts_with("0x0") {
            trimmed = format!("0x{}", &trimmed[3..]);
        }
        Self { raw, trimmed }
    }

    /// Trimmed hex string (what the RPC receives).
    pub fn as_str(&self) -> &str {
        &self.trimmed
    }

    /// Keccak output before trimming.
    pub fn raw(&self) -> B256 {
        self.raw
    }

    /// Number of zero nibbles removed from the front.
    pub fn trimmed_nibbles(&self) -> usize {
        66 - self.trimmed.len()
    }

    /// Trimmed key left-padded back out to a 32-byte word.
    pub fn to_word(&self) -> B256 {
        let digits = &self.trimmed[2..];
        if digits.is_empty() {
            return B256::ZERO;
        }
        // At most 64 hex digits, so this cannot overflow
        U256::from_str_radix(digits, 16)
            .map(B256::from)
            .unwrap_or(self.raw)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trimmed)
    }
}

/// Raw mapping hash for `holder` under the given layout.
pub fn mapping_hash(holder: Address, slot_index: u64, is_vyper: bool) -> B256 {
    let slot = U256::from(slot_index);
    if is_vyper {
        keccak256((slot, holder).abi_encode())
    } else {
        keccak256((holder, slot).abi_encode())
    }
}

/// Storage key of `holder`'s balance for a token described by `entry`.
pub fn balance_storage_key(holder: Address, entry: &TokenSlotEntry) -> StorageKey {
    StorageKey::from_hash(mapping_hash(holder, entry.slot_index, entry.is_vyper))
}
