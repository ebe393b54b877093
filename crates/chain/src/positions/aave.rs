//! Aave V3 and Spark account data.

use alloy::primitives::Address;
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{AccountDataView, PositionReader, PositionView};
use crate::contracts::IAaveV3Pool;
use crate::error::Result;
use crate::session::ForkSession;

/// Reads `getUserAccountData` from an Aave V3 pool or a fork of it.
#[derive(Debug, Clone, Copy)]
pub struct AaveV3Reader {
    pool: Address,
    protocol: Protocol,
}

impl AaveV3Reader {
    pub fn aave(pool: Address) -> Self {
        Self {
            pool,
            protocol: Protocol::AaveV3,
        }
    }

    /// Spark deploys the same pool contract.
    pub fn spark(pool: Address) -> Self {
        Self {
            pool,
            protocol: Protocol::Spark,
        }
    }
}

#[async_trait]
impl PositionReader for AaveV3Reader {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let data = IAaveV3Pool::new(self.pool, &provider)
            .getUserAccountData(user)
            .call()
            .await?;

        let view = AccountDataView {
            user,
            pool: self.pool,
            total_collateral_base: data.totalCollateralBase.to_string(),
            total_debt_base: data.totalDebtBase.to_string(),
            available_borrows_base: data.availableBorrowsBase.to_string(),
            current_liquidation_threshold: data.currentLiquidationThreshold.to_string(),
            ltv: data.ltv.to_string(),
            health_factor: data.healthFactor.to_string(),
        };

        Ok(match self.protocol {
            Protocol::Spark => PositionView::Spark(view),
            _ => PositionView::AaveV3(view),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_call;
    use alloy::primitives::{address, U256};
    use alloy::sol_types::{SolCall, SolValue};
    use forkooor_core::ForkDialect;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_account_data() {
        let server = MockServer::start().await;
        let output = (
            U256::from(500_000_000_000u64),
            U256::from(100_000_000_000u64),
            U256::from(300_000_000_000u64),
            U256::from(8250),
            U256::from(8000),
            U256::from(4_125_000_000_000_000_000u128),
        )
            .abi_encode_params();
        mock_call(&server, IAaveV3Pool::getUserAccountDataCall::SELECTOR, output).await;

        let session = ForkSession::bind(&server.uri(), ForkDialect::Tenderly).unwrap();
        let pool = address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");
        let user = address!("1111111111111111111111111111111111111111");

        let view = AaveV3Reader::spark(pool).position(&session, user).await.unwrap();
        let PositionView::Spark(data) = view else {
            panic!("expected spark view");
        };
        assert_eq!(data.total_collateral_base, "500000000000");
        assert_eq!(data.ltv, "8000");
        assert_eq!(data.health_factor, "4125000000000000000");
    }
}
