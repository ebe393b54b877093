//! Smart wallet execution.
//!
//! Positions are owned by a smart wallet, not by the EOA. Calls meant to run
//! in the wallet's context are wrapped in the wallet's own execute entry
//! point and sent from the owner.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::contracts::{IDSProxy, ISafe};
use crate::error::Result;
use crate::sender::ImpersonatedSender;
use crate::session::ForkSession;

/// Safe `Enum.Operation.DelegateCall`.
const SAFE_DELEGATE_CALL: u8 = 1;

/// Kind of smart wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    #[serde(alias = "proxy")]
    DsProxy,
    Safe,
}

impl FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dsproxy" | "proxy" | "ds-proxy" => Ok(Self::DsProxy),
            "safe" => Ok(Self::Safe),
            _ => Err(format!("unknown wallet type '{s}'")),
        }
    }
}

/// A smart wallet on the fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartWallet {
    pub address: Address,
    pub kind: WalletType,
}

impl SmartWallet {
    pub fn new(address: Address, kind: WalletType) -> Self {
        Self { address, kind }
    }

    /// Calldata that makes the wallet delegate-call `target` with `data`.
    pub fn encode_execute(&self, owner: Address, target: Address, data: Bytes) -> Bytes {
        match self.kind {
            WalletType::DsProxy => IDSProxy::executeCall { target, data }.abi_encode().into(),
            WalletType::Safe => ISafe::execTransactionCall {
                to: target,
                value: U256::ZERO,
                data,
                operation: SAFE_DELEGATE_CALL,
                safeTxGas: U256::ZERO,
                baseGas: U256::ZERO,
                gasPrice: U256::ZERO,
                gasToken: Address::ZERO,
                refundReceiver: Address::ZERO,
                signatures: prevalidated_signature(owner),
            }
            .abi_encode()
            .into(),
        }
    }

    /// Execute `data` against `target` in the wallet's context, sent as `owner`.
    pub async fn execute(
        &self,
        session: &ForkSession,
        owner: Address,
        target: Address,
        data: Bytes,
    ) -> Result<TxHash> {
        debug!(wallet = %self.address, kind = ?self.kind, target = %target, "Executing through smart wallet");
        let calldata = self.encode_execute(owner, target, data);
        ImpersonatedSender::new(session, owner)
            .send(self.address, calldata, U256::ZERO)
            .await
    }
}

/// Safe signature accepted without a real signature when `owner` is the caller.
///
/// Layout: `r` = owner left-padded to 32 bytes, `s` = 0, `v` = 1.
pub fn prevalidated_signature(owner: Address) -> Bytes {
    let mut signature = [0u8; 65];
    signature[12..32].copy_from_slice(owner.as_slice());
    signature[64] = 1;
    Bytes::copy_from_slice(&signature)
}
