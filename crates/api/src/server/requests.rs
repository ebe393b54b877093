//! Request bodies and field validation.
//!
//! Bodies are deserialized leniently (every field optional) and then checked
//! by a [`Validator`], so one response can list every problem at once and no
//! network call happens for an invalid request.

use alloy::primitives::{Address, Bytes, B256, U256};
use forkooor_chain::NetworkSelector;
use forkooor_core::validate_decimal;
use serde::Deserialize;
use std::str::FromStr;

use super::error::{ApiError, FieldError};

/// Chain assumed when a request omits `chainId`.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Network selector fields shared by every body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFields {
    pub vnet_url: Option<String>,
    pub vnet_id: Option<String>,
    pub fork_id: Option<String>,
    pub chain_id: Option<u64>,
}

/// Validated network target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub selector: NetworkSelector,
    pub chain_id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTokenBalanceRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub token: Option<String>,
    pub account: Option<String>,
    pub amount: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEthBalanceRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub account: Option<String>,
    pub amount: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub token: Option<String>,
    pub account: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub spender: Option<String>,
    pub amount: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTravelRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub seconds: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTimestampRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub user: Option<String>,
    pub market: Option<String>,
    /// Vault, trove or NFT id for protocols that key positions by id
    pub position_id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub chain_id: Option<u64>,
    pub protocol: Option<String>,
    pub operation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[serde(flatten)]
    pub network: NetworkFields,
    pub protocol: Option<String>,
    pub operation: Option<String>,
    pub owner: Option<String>,
    pub wallet: Option<String>,
    pub wallet_type: Option<String>,
    #[serde(default)]
    pub trigger_data: Vec<String>,
    #[serde(default)]
    pub sub_data: Vec<String>,
}

/// Collects field errors while extracting typed values.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Exactly one of `vnetUrl`, `vnetId`, `forkId`.
    pub fn network(&mut self, fields: &NetworkFields) -> Option<Target> {
        let given: Vec<NetworkSelector> = [
            fields.vnet_url.clone().map(NetworkSelector::VnetUrl),
            fields.vnet_id.clone().map(NetworkSelector::VnetId),
            fields.fork_id.clone().map(NetworkSelector::ForkId),
        ]
        .into_iter()
        .flatten()
        .collect();

        let chain_id = fields.chain_id.unwrap_or(DEFAULT_CHAIN_ID);
        match given.len() {
            0 => {
                self.error("vnetUrl", "one of vnetUrl, vnetId or forkId is required");
                None
            }
            1 => given.into_iter().next().and_then(|selector| {
                let empty = match &selector {
                    NetworkSelector::VnetUrl(v) | NetworkSelector::VnetId(v) | NetworkSelector::ForkId(v) => {
                        v.trim().is_empty()
                    }
                };
                if empty {
                    self.error("vnetUrl", "network selector must not be empty");
                    return None;
                }
                Some(Target { selector, chain_id })
            }),
            _ => {
                self.error("vnetUrl", "only one of vnetUrl, vnetId or forkId may be given");
                None
            }
        }
    }

    /// Non-empty string.
    pub fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.error(field, "is required");
                None
            }
        }
    }

    /// 20-byte hex address.
    pub fn address(&mut self, field: &str, value: &Option<String>) -> Option<Address> {
        let raw = self.required(field, value)?;
        match raw.parse::<Address>() {
            Ok(address) => Some(address),
            Err(_) => {
                self.error(field, format!("'{raw}' is not a valid address"));
                None
            }
        }
    }

    /// Non-negative decimal number given as string or JSON number.
    pub fn amount(&mut self, field: &str, value: &Option<serde_json::Value>) -> Option<String> {
        let text = match value {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(_) => {
                self.error(field, "must be a decimal string or number");
                return None;
            }
            None => {
                self.error(field, "is required");
                return None;
            }
        };

        match validate_decimal(&text) {
            Ok(()) => Some(text),
            Err(e) => {
                self.error(field, e.to_string());
                None
            }
        }
    }

    /// Non-negative integer given as string or JSON number.
    pub fn integer(&mut self, field: &str, value: &Option<serde_json::Value>) -> Option<u64> {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
            None => {
                self.error(field, "is required");
                return None;
            }
            Some(_) => None,
        };
        if parsed.is_none() {
            self.error(field, "must be a non-negative integer");
        }
        parsed
    }

    /// uint256 id given as JSON number, decimal string or 0x hex string.
    pub fn uint256(&mut self, field: &str, value: &Option<serde_json::Value>) -> Option<U256> {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => n.as_u64().map(U256::from),
            Some(serde_json::Value::String(s)) => s.trim().parse::<U256>().ok(),
            None => {
                self.error(field, "is required");
                return None;
            }
            Some(_) => None,
        };
        if parsed.is_none() {
            self.error(field, "must be a uint256 as a number, decimal or 0x hex string");
        }
        parsed
    }

    /// Value parsed with `FromStr`, error message from the parser.
    pub fn parsed<T>(&mut self, field: &str, value: &Option<String>) -> Option<T>
    where
        T: FromStr<Err = String>,
    {
        let raw = self.required(field, value)?;
        match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.error(field, e);
                None
            }
        }
    }

    /// List of hex byte strings.
    pub fn bytes_list(&mut self, field: &str, values: &[String]) -> Option<Vec<Bytes>> {
        let mut out = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            match value.parse::<Bytes>() {
                Ok(bytes) => out.push(bytes),
                Err(_) => {
                    self.error(&format!("{field}[{i}]"), "is not valid hex");
                    return None;
                }
            }
        }
        Some(out)
    }

    /// List of 32-byte hex words.
    pub fn words_list(&mut self, field: &str, values: &[String]) -> Option<Vec<B256>> {
        let mut out = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            match value.parse::<B256>() {
                Ok(word) => out.push(word),
                Err(_) => {
                    self.error(&format!("{field}[{i}]"), "is not a 32-byte hex word");
                    return None;
                }
            }
        }
        Some(out)
    }

    /// Errors collected so far, as a response.
    pub fn into_error(self) -> ApiError {
        ApiError::Validation(self.errors)
    }
}
