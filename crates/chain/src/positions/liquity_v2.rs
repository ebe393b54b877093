//! Liquity V2 troves, one TroveManager per collateral branch.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{PositionReader, PositionView, TroveV2View};
use crate::contracts::ITroveManagerV2;
use crate::error::Result;
use crate::session::ForkSession;

#[derive(Debug, Clone, Copy)]
pub struct LiquityV2Reader {
    trove_manager: Address,
    trove_id: U256,
}

impl LiquityV2Reader {
    pub fn new(trove_manager: Address, trove_id: U256) -> Self {
        Self {
            trove_manager,
            trove_id,
        }
    }
}

fn status_name(status: u8) -> &'static str {
    match status {
        0 => "nonExistent",
        1 => "active",
        2 => "closedByOwner",
        3 => "closedByLiquidation",
        4 => "zombie",
        _ => "unknown",
    }
}

#[async_trait]
impl PositionReader for LiquityV2Reader {
    fn protocol(&self) -> Protocol {
        Protocol::LiquityV2
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let trove_manager = ITroveManagerV2::new(self.trove_manager, &provider);

        let status_call = trove_manager.getTroveStatus(self.trove_id);
        let data_call = trove_manager.getLatestTroveData(self.trove_id);
        let (status, trove) = tokio::try_join!(status_call.call(), data_call.call())?;

        Ok(PositionView::LiquityV2(TroveV2View {
            user,
            trove_manager: self.trove_manager,
            trove_id: self.trove_id.to_string(),
            status: status_name(status._0).to_string(),
            entire_debt: trove.entireDebt.to_string(),
            entire_coll: trove.entireColl.to_string(),
            accrued_interest: trove.accruedInterest.to_string(),
            annual_interest_rate: trove.annualInterestRate.to_string(),
            last_interest_rate_adj_time: trove.lastInterestRateAdjTime.to_string(),
        }))
    }
}
