//! Fluid vault positions, addressed by NFT id.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{FluidView, PositionReader, PositionView};
use crate::contracts::IFluidVaultResolver;
use crate::error::{ChainError, Result};
use crate::session::ForkSession;

#[derive(Debug, Clone, Copy)]
pub struct FluidReader {
    resolver: Address,
    nft_id: U256,
}

impl FluidReader {
    pub fn new(resolver: Address, nft_id: U256) -> Self {
        Self { resolver, nft_id }
    }
}

#[async_trait]
impl PositionReader for FluidReader {
    fn protocol(&self) -> Protocol {
        Protocol::Fluid
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let resolver = IFluidVaultResolver::new(self.resolver, &provider);

        let position_call = resolver.positionByNftId(self.nft_id);
        let vault_call = resolver.vaultByNftId(self.nft_id);
        let (position, vault) = tokio::try_join!(position_call.call(), vault_call.call())?;
        if position.owner == Address::ZERO {
            return Err(ChainError::PositionNotFound {
                protocol: Protocol::Fluid,
                id: self.nft_id.to_string(),
            });
        }

        Ok(PositionView::Fluid(FluidView {
            user,
            nft_id: self.nft_id.to_string(),
            vault: vault._0,
            owner: position.owner,
            is_liquidated: position.isLiquidated,
            is_supply_position: position.isSupplyPosition,
            tick: position.tick.to_string(),
            supply: position.supply.to_string(),
            borrow: position.borrow.to_string(),
            dust_borrow: position.dustBorrow.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_call;
    use alloy::primitives::{address, I256};
    use alloy::sol_types::{SolCall, SolValue};
    use forkooor_core::ForkDialect;
    use wiremock::MockServer;

    const RESOLVER: Address = address!("3333333333333333333333333333333333333333");
    const USER: Address = address!("1111111111111111111111111111111111111111");

    fn position_output(owner: Address) -> Vec<u8> {
        let tick: I256 = "-120".parse().unwrap();
        let mut output = (
            U256::from(77u64),
            owner,
            false,
            false,
            tick,
            U256::from(3u64),
            U256::from(2_000u64),
            U256::from(1_000u64),
            U256::ZERO,
            U256::from(2_001u64),
            U256::from(1_002u64),
            U256::from(5u64),
        )
            .abi_encode_params();
        // Vault data follows the position in the real return value
        output.extend_from_slice(&U256::from(0x1a0u64).to_be_bytes::<32>());
        output
    }

    #[tokio::test]
    async fn test_nft_position() {
        let server = MockServer::start().await;
        let vault = address!("4444444444444444444444444444444444444444");
        mock_call(
            &server,
            IFluidVaultResolver::positionByNftIdCall::SELECTOR,
            position_output(USER),
        )
        .await;
        mock_call(&server, IFluidVaultResolver::vaultByNftIdCall::SELECTOR, vault.abi_encode())
            .await;

        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();
        let view = FluidReader::new(RESOLVER, U256::from(77u64))
            .position(&session, USER)
            .await
            .unwrap();
        let PositionView::Fluid(position) = view else {
            panic!("expected fluid view");
        };
        assert_eq!(position.vault, vault);
        assert_eq!(position.owner, USER);
        assert_eq!(position.tick, "-120");
        assert_eq!(position.supply, "2001");
        assert_eq!(position.borrow, "1002");
        assert_eq!(position.dust_borrow, "5");
    }

    #[tokio::test]
    async fn test_unowned_nft_not_found() {
        let server = MockServer::start().await;
        mock_call(
            &server,
            IFluidVaultResolver::positionByNftIdCall::SELECTOR,
            position_output(Address::ZERO),
        )
        .await;
        mock_call(
            &server,
            IFluidVaultResolver::vaultByNftIdCall::SELECTOR,
            Address::ZERO.abi_encode(),
        )
        .await;

        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();
        let result = FluidReader::new(RESOLVER, U256::from(77u64)).position(&session, USER).await;
        assert!(matches!(
            result,
            Err(ChainError::PositionNotFound { protocol: Protocol::Fluid, .. })
        ));
    }
}
