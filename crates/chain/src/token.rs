//! ERC-20 reads and impersonated approvals.

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolCall;
use tracing::info;

use crate::contracts::IERC20;
use crate::error::Result;
use crate::sender::ImpersonatedSender;
use crate::session::ForkSession;

/// `balanceOf(holder)` on `token`.
pub async fn balance_of(session: &ForkSession, token: Address, holder: Address) -> Result<U256> {
    let provider = session.provider();
    let balance = IERC20::new(token, &provider).balanceOf(holder).call().await?;
    Ok(balance._0)
}

/// `decimals()` on `token`.
pub async fn decimals(session: &ForkSession, token: Address) -> Result<u8> {
    let provider = session.provider();
    let decimals = IERC20::new(token, &provider).decimals().call().await?;
    Ok(decimals._0)
}

/// Approve `spender` for `amount` of `token`, sent as `owner`.
pub async fn approve(
    session: &ForkSession,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256,
) -> Result<TxHash> {
    let data = IERC20::approveCall { spender, amount }.abi_encode();
    let hash = ImpersonatedSender::new(session, owner)
        .send(token, data.into(), U256::ZERO)
        .await?;
    info!(token = %token, owner = %owner, spender = %spender, amount = %amount, tx = %hash, "Approved");
    Ok(hash)
}
