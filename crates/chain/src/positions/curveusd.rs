//! CurveUSD loans.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{CurveUsdView, PositionReader, PositionView};
use crate::contracts::ICrvUsdController;
use crate::error::Result;
use crate::session::ForkSession;

#[derive(Debug, Clone, Copy)]
pub struct CurveUsdReader {
    controller: Address,
}

impl CurveUsdReader {
    pub fn new(controller: Address) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl PositionReader for CurveUsdReader {
    fn protocol(&self) -> Protocol {
        Protocol::Curveusd
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let controller = ICrvUsdController::new(self.controller, &provider);

        // health() reverts when there is no loan
        let exists = controller.loan_exists(user).call().await?._0;
        if !exists {
            return Ok(PositionView::Curveusd(CurveUsdView {
                user,
                controller: self.controller,
                loan_exists: false,
                collateral: "0".into(),
                stablecoin: "0".into(),
                debt: "0".into(),
                bands: "0".into(),
                health: "0".into(),
            }));
        }

        let state_call = controller.user_state(user);
        let health_call = controller.health(user, true);
        let (state, health) = tokio::try_join!(state_call.call(), health_call.call())?;
        let [collateral, stablecoin, debt, bands]: [U256; 4] = state._0;

        Ok(PositionView::Curveusd(CurveUsdView {
            user,
            controller: self.controller,
            loan_exists: true,
            collateral: collateral.to_string(),
            stablecoin: stablecoin.to_string(),
            debt: debt.to_string(),
            bands: bands.to_string(),
            health: health._0.to_string(),
        }))
    }
}
