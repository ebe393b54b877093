//! Proxy token resolution.
//!
//! Some ERC-20s are thin proxies whose balances live in a separate state
//! contract. Writing the balance slot on the proxy has no effect, so before
//! computing a storage key we find the contract that actually holds the
//! mapping. Plain tokens, which are the common case, fail the probe and are
//! used as-is.

use alloy::primitives::Address;
use tracing::debug;

use crate::contracts::{IProxyERC20, ISynth};
use crate::session::ForkSession;

/// Outcome of probing a token for a proxy layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenResolution {
    /// Balances live on the token itself
    Direct(Address),
    /// Balances live on `state`, reached through `proxy.target().tokenState()`
    ProxyResolved {
        proxy: Address,
        target: Address,
        state: Address,
    },
}

impl TokenResolution {
    /// Address the caller asked about.
    pub fn original(&self) -> Address {
        match self {
            Self::Direct(token) => *token,
            Self::ProxyResolved { proxy, .. } => *proxy,
        }
    }

    /// Address holding the balance mapping.
    pub fn storage_address(&self) -> Address {
        match self {
            Self::Direct(token) => *token,
            Self::ProxyResolved { state, .. } => *state,
        }
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::ProxyResolved { .. })
    }
}

/// Resolve the storage-bearing address of `token`.
///
/// Never fails: a revert, a missing method or a zero address at either hop
/// means the token is not a proxy.
pub async fn resolve(session: &ForkSession, token: Address) -> TokenResolution {
    match probe(session, token).await {
        Some((target, state)) => {
            debug!(token = %token, target = %target, state = %state, "Resolved proxy token");
            TokenResolution::ProxyResolved {
                proxy: token,
                target,
                state,
            }
        }
        None => TokenResolution::Direct(token),
    }
}

async fn probe(session: &ForkSession, token: Address) -> Option<(Address, Address)> {
    let provider = session.provider();

    let target = match IProxyERC20::new(token, &provider).target().call().await {
        Ok(result) if !result._0.is_zero() => result._0,
        Ok(_) => return None,
        Err(e) => {
            debug!(token = %token, error = %e, "target() probe failed, treating as plain token");
            return None;
        }
    };

    match ISynth::new(target, &provider).tokenState().call().await {
        Ok(result) if !result._0.is_zero() => Some((target, result._0)),
        Ok(_) => None,
        Err(e) => {
            debug!(token = %token, target = %target, error = %e, "tokenState() probe failed, treating as plain token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_call, mock_call_revert};
    use alloy::primitives::address;
    use alloy::sol_types::{SolCall, SolValue};
    use forkooor_core::ForkDialect;
    use wiremock::MockServer;

    const TOKEN: Address = address!("57ab1ec28d129707052df4df418d58a2d46d5f51");
    const TARGET: Address = address!("1111111111111111111111111111111111111111");
    const STATE: Address = address!("2222222222222222222222222222222222222222");

    async fn session(server: &MockServer) -> ForkSession {
        ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap()
    }

    #[tokio::test]
    async fn test_plain_token_is_direct() {
        let server = MockServer::start().await;
        mock_call_revert(&server, IProxyERC20::targetCall::SELECTOR).await;

        let resolution = resolve(&session(&server).await, TOKEN).await;
        assert_eq!(resolution, TokenResolution::Direct(TOKEN));
        assert_eq!(resolution.storage_address(), TOKEN);
        assert!(!resolution.is_proxy());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_direct() {
        let server = MockServer::start().await;
        let resolution = resolve(&session(&server).await, TOKEN).await;
        assert_eq!(resolution, TokenResolution::Direct(TOKEN));
    }

    #[tokio::test]
    async fn test_proxy_resolves_to_state() {
        let server = MockServer::start().await;
        mock_call(&server, IProxyERC20::targetCall::SELECTOR, TARGET.abi_encode()).await;
        mock_call(&server, ISynth::tokenStateCall::SELECTOR, STATE.abi_encode()).await;

        let resolution = resolve(&session(&server).await, TOKEN).await;
        assert_eq!(
            resolution,
            TokenResolution::ProxyResolved {
                proxy: TOKEN,
                target: TARGET,
                state: STATE,
            }
        );
        assert_eq!(resolution.original(), TOKEN);
        assert_eq!(resolution.storage_address(), STATE);
    }

    #[tokio::test]
    async fn test_target_without_token_state_is_direct() {
        let server = MockServer::start().await;
        mock_call(&server, IProxyERC20::targetCall::SELECTOR, TARGET.abi_encode()).await;
        mock_call_revert(&server, ISynth::tokenStateCall::SELECTOR).await;

        let resolution = resolve(&session(&server).await, TOKEN).await;
        assert_eq!(resolution, TokenResolution::Direct(TOKEN));
    }

    #[tokio::test]
    async fn test_zero_target_is_direct() {
        let server = MockServer::start().await;
        mock_call(&server, IProxyERC20::targetCall::SELECTOR, Address::ZERO.abi_encode()).await;

        let resolution = resolve(&session(&server).await, TOKEN).await;
        assert_eq!(resolution, TokenResolution::Direct(TOKEN));
    }
}
