//! Morpho Blue positions.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{MorphoView, PositionReader, PositionView};
use crate::contracts::IMorphoBlue;
use crate::error::Result;
use crate::session::ForkSession;

#[derive(Debug, Clone, Copy)]
pub struct MorphoBlueReader {
    morpho: Address,
    market_id: B256,
}

impl MorphoBlueReader {
    pub fn new(morpho: Address, market_id: B256) -> Self {
        Self { morpho, market_id }
    }
}

#[async_trait]
impl PositionReader for MorphoBlueReader {
    fn protocol(&self) -> Protocol {
        Protocol::MorphoBlue
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let position = IMorphoBlue::new(self.morpho, &provider)
            .position(self.market_id, user)
            .call()
            .await?;

        Ok(PositionView::MorphoBlue(MorphoView {
            user,
            market_id: self.market_id,
            supply_shares: position.supplyShares.to_string(),
            borrow_shares: position.borrowShares.to_string(),
            collateral: position.collateral.to_string(),
        }))
    }
}
