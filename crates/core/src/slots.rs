//! Storage slot table for ERC-20 balance mappings.
//!
//! Maps `(chain_id, token)` to the storage slot index of the token's
//! `balanceOf` mapping and the language that laid it out. The table is loaded
//! once at startup and never mutated afterwards.
//!
//! File format:
//!
//! ```json
//! {
//!   "1": {
//!     "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48": { "slot": 9, "isVyper": false }
//!   }
//! }
//! ```

use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{CoreError, Result};

/// Storage layout of a single token's balance mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSlotEntry {
    /// Chain the token lives on
    pub chain_id: u64,
    /// Token contract holding the mapping
    pub token: Address,
    /// Slot index of `balanceOf`
    pub slot_index: u64,
    /// Vyper orders the mapping hash inputs differently
    pub is_vyper: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlotEntry {
    slot: u64,
    #[serde(default)]
    is_vyper: bool,
}

/// Immutable `(chain_id, token)` → slot lookup.
#[derive(Debug, Default, Clone)]
pub struct StorageSlotTable {
    entries: HashMap<(u64, Address), TokenSlotEntry>,
}

impl StorageSlotTable {
    /// Build a table from entries, rejecting duplicate keys.
    pub fn from_entries(entries: impl IntoIterator<Item = TokenSlotEntry>) -> Result<Self> {
        let mut table = HashMap::new();
        for entry in entries {
            if table.insert((entry.chain_id, entry.token), entry).is_some() {
                return Err(CoreError::InvalidSlotTable(format!(
                    "duplicate entry for {} on chain {}",
                    entry.token, entry.chain_id
                )));
            }
        }
        Ok(Self { entries: table })
    }

    /// Parse the JSON table.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, RawSlotEntry>> = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidSlotTable(e.to_string()))?;

        let mut entries = Vec::new();
        for (chain, tokens) in raw {
            let chain_id: u64 = chain
                .parse()
                .map_err(|_| CoreError::InvalidSlotTable(format!("bad chain id '{}'", chain)))?;

            for (token, slot) in tokens {
                let token: Address = token.parse().map_err(|e| {
                    CoreError::InvalidSlotTable(format!("bad token address '{}': {}", token, e))
                })?;
                entries.push(TokenSlotEntry {
                    chain_id,
                    token,
                    slot_index: slot.slot,
                    is_vyper: slot.is_vyper,
                });
            }
        }

        Self::from_entries(entries)
    }

    /// Load the JSON table from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidSlotTable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let table = Self::from_json(&content)?;
        info!(
            file = %path.display(),
            entries = table.len(),
            "Storage slot table loaded"
        );
        Ok(table)
    }

    /// Look up the slot entry for a token. Absence is an error, never slot 0.
    pub fn lookup(&self, chain_id: u64, token: Address) -> Result<&TokenSlotEntry> {
        self.entries
            .get(&(chain_id, token))
            .ok_or(CoreError::SlotNotFound { chain_id, token })
    }

    /// Whether a token has an entry on this chain.
    pub fn contains(&self, chain_id: u64, token: Address) -> bool {
        self.entries.contains_key(&(chain_id, token))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
