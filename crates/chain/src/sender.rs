//! Impersonated transaction sending.
//!
//! Fork providers accept `eth_sendTransaction` from any address, so no key
//! is needed: the transaction is submitted as-is and mined on arrival.

use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use std::borrow::Cow;
use tracing::{debug, info, instrument, warn};

use crate::error::{ChainError, Result};
use crate::session::ForkSession;

/// Sends transactions from an arbitrary address on a fork.
pub struct ImpersonatedSender<'a> {
    session: &'a ForkSession,
    from: Address,
}

impl<'a> ImpersonatedSender<'a> {
    pub fn new(session: &'a ForkSession, from: Address) -> Self {
        Self { session, from }
    }

    /// Sender address.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Build the request sent for a call.
    pub fn request(&self, to: Address, data: Bytes, value: U256) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.from),
            to: Some(TxKind::Call(to)),
            value: Some(value),
            // Some nodes only read `data`, others only `input`
            input: TransactionInput::both(data),
            ..Default::default()
        }
    }

    /// Send one transaction and wait for its receipt.
    ///
    /// A mined-but-failed transaction is an error. Single attempt.
    #[instrument(skip(self, data), fields(from = %self.from))]
    pub async fn send(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash> {
        let tx = self.request(to, data, value);
        let provider = self.session.provider();

        let hash: TxHash = provider
            .raw_request(Cow::Borrowed("eth_sendTransaction"), (tx,))
            .await?;
        debug!(tx = %hash, "Transaction submitted");

        let receipt = provider
            .get_transaction_receipt(hash)
            .await?
            .ok_or(ChainError::MissingReceipt(hash))?;

        if !receipt.status() {
            warn!(tx = %hash, to = %to, "Transaction reverted");
            return Err(ChainError::TransactionReverted(hash));
        }

        info!(tx = %hash, to = %to, gas_used = receipt.gas_used, "Transaction confirmed");
        Ok(hash)
    }
}
