//! Liquity V1 troves.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{PositionReader, PositionView, TroveView};
use crate::contracts::ITroveManager;
use crate::error::Result;
use crate::session::ForkSession;

#[derive(Debug, Clone, Copy)]
pub struct LiquityReader {
    trove_manager: Address,
}

impl LiquityReader {
    pub fn new(trove_manager: Address) -> Self {
        Self { trove_manager }
    }
}

/// Name of a TroveManager `Status` value.
fn status_name(status: U256) -> &'static str {
    if status > U256::from(u8::MAX) {
        return "unknown";
    }
    match status.to::<u8>() {
        0 => "nonExistent",
        1 => "active",
        2 => "closedByOwner",
        3 => "closedByLiquidation",
        4 => "closedByRedemption",
        _ => "unknown",
    }
}

#[async_trait]
impl PositionReader for LiquityReader {
    fn protocol(&self) -> Protocol {
        Protocol::Liquity
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let trove_manager = ITroveManager::new(self.trove_manager, &provider);

        let status_call = trove_manager.getTroveStatus(user);
        let debt_call = trove_manager.getEntireDebtAndColl(user);
        let (status, trove) = tokio::try_join!(status_call.call(), debt_call.call())?;

        Ok(PositionView::Liquity(TroveView {
            user,
            status: status_name(status._0).to_string(),
            debt: trove.debt.to_string(),
            coll: trove.coll.to_string(),
            pending_lusd_debt_reward: trove.pendingLUSDDebtReward.to_string(),
            pending_eth_reward: trove.pendingETHReward.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(status_name(U256::from(1)), "active");
        assert_eq!(status_name(U256::from(3)), "closedByLiquidation");
        assert_eq!(status_name(U256::from(9)), "unknown");
        assert_eq!(status_name(U256::MAX), "unknown");
    }
}
