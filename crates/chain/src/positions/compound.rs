//! Compound V3 (Comet) positions.

use alloy::primitives::Address;
use async_trait::async_trait;
use forkooor_core::Protocol;
use futures::future::try_join_all;

use super::{CollateralBalance, CometView, PositionReader, PositionView};
use crate::contracts::IComet;
use crate::error::Result;
use crate::session::ForkSession;

/// Reads base and collateral balances from one Comet market.
#[derive(Debug, Clone)]
pub struct CompoundV3Reader {
    comet: Address,
    /// (symbol, asset) pairs to report
    collaterals: Vec<(String, Address)>,
}

impl CompoundV3Reader {
    pub fn new(comet: Address, collaterals: Vec<(String, Address)>) -> Self {
        Self { comet, collaterals }
    }
}

#[async_trait]
impl PositionReader for CompoundV3Reader {
    fn protocol(&self) -> Protocol {
        Protocol::CompoundV3
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let comet = IComet::new(self.comet, &provider);

        let base_call = comet.baseToken();
        let supply_call = comet.balanceOf(user);
        let borrow_call = comet.borrowBalanceOf(user);
        let (base_token, supply, borrow) =
            tokio::try_join!(base_call.call(), supply_call.call(), borrow_call.call())?;

        let collaterals = try_join_all(self.collaterals.iter().map(|(symbol, asset)| {
            let comet = &comet;
            async move {
                let balance = comet.collateralBalanceOf(user, *asset).call().await?;
                Ok::<_, alloy::contract::Error>(CollateralBalance {
                    symbol: symbol.clone(),
                    asset: *asset,
                    balance: balance._0.to_string(),
                })
            }
        }))
        .await?;

        Ok(PositionView::CompoundV3(CometView {
            user,
            comet: self.comet,
            base_token: base_token._0,
            supply_balance: supply._0.to_string(),
            borrow_balance: borrow._0.to_string(),
            collaterals,
        }))
    }
}
