//! Maker vaults, addressed by CDP manager id.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use forkooor_core::Protocol;

use super::{MakerView, PositionReader, PositionView};
use crate::contracts::{IDssCdpManager, IVat};
use crate::error::{ChainError, Result};
use crate::session::ForkSession;

/// Fixed-point base of Vat rates.
const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

#[derive(Debug, Clone, Copy)]
pub struct MakerReader {
    vat: Address,
    cdp_manager: Address,
    cdp_id: U256,
}

impl MakerReader {
    pub fn new(vat: Address, cdp_manager: Address, cdp_id: U256) -> Self {
        Self {
            vat,
            cdp_manager,
            cdp_id,
        }
    }
}

/// Collateral type name, e.g. "ETH-A".
fn ilk_name(ilk: B256) -> String {
    let end = ilk.iter().position(|b| *b == 0).unwrap_or(ilk.len());
    String::from_utf8_lossy(&ilk[..end]).into_owned()
}

/// Debt in DAI wad: `art * rate / RAY`.
fn debt(art: U256, rate: U256) -> Option<U256> {
    art.checked_mul(rate).map(|d| d / U256::from(RAY))
}

#[async_trait]
impl PositionReader for MakerReader {
    fn protocol(&self) -> Protocol {
        Protocol::Maker
    }

    async fn position(&self, session: &ForkSession, user: Address) -> Result<PositionView> {
        let provider = session.provider();
        let manager = IDssCdpManager::new(self.cdp_manager, &provider);
        let vat = IVat::new(self.vat, &provider);

        let urn_call = manager.urns(self.cdp_id);
        let ilk_call = manager.ilks(self.cdp_id);
        let owner_call = manager.owns(self.cdp_id);
        let (urn, ilk, owner) =
            tokio::try_join!(urn_call.call(), ilk_call.call(), owner_call.call())?;
        let (urn, ilk, owner) = (urn._0, ilk._0, owner._0);
        if urn == Address::ZERO {
            return Err(ChainError::PositionNotFound {
                protocol: Protocol::Maker,
                id: self.cdp_id.to_string(),
            });
        }

        let vault_call = vat.urns(ilk, urn);
        let rate_call = vat.ilks(ilk);
        let (vault, rates) = tokio::try_join!(vault_call.call(), rate_call.call())?;
        let debt = debt(vault.art, rates.rate).ok_or_else(|| {
            ChainError::UnexpectedResponse(format!(
                "debt of vault {} overflows uint256",
                self.cdp_id
            ))
        })?;

        Ok(PositionView::Maker(MakerView {
            user,
            cdp_id: self.cdp_id.to_string(),
            urn,
            owner,
            ilk: ilk_name(ilk),
            collateral: vault.ink.to_string(),
            normalized_debt: vault.art.to_string(),
            rate: rates.rate.to_string(),
            debt: debt.to_string(),
        }))
    }
}
