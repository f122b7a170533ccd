use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Timestamp, Uint128};

use crate::error::ContractError;
use crate::policy::SalePolicy;
use crate::pricing::Segment;

/// Where the sale stands. Never stored, always derived from the timeline,
/// the tokens sold and the finalize switch at the time of the call.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Phase {
    NotStarted,
    PreSale,
    /// Pre-sale reached its soft cap, main sale has not started yet
    AwaitingMainSale,
    MainSale,
    /// Sale closed with the soft cap reached, waiting for finalize
    Succeeded,
    /// Pre-sale missed its soft cap, or the main sale closed below the soft cap
    Refunding,
    Finalized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub pre_sale_start: Timestamp,
    pub pre_sale_end: Timestamp,
    pub ico_start: Timestamp,
    pub ico_end: Timestamp,
}

impl Timeline {
    pub fn phase(
        &self,
        now: Timestamp,
        tokens_sold: Uint128,
        policy: &SalePolicy,
        finalized: bool,
    ) -> Phase {
        if finalized {
            Phase::Finalized
        } else if now < self.pre_sale_start {
            Phase::NotStarted
        } else if now < self.pre_sale_end {
            Phase::PreSale
        } else if tokens_sold < policy.pre_sale_soft_cap {
            Phase::Refunding
        } else if now < self.ico_start {
            Phase::AwaitingMainSale
        } else if now < self.ico_end {
            Phase::MainSale
        } else if tokens_sold >= policy.soft_cap {
            Phase::Succeeded
        } else {
            Phase::Refunding
        }
    }

    /// Price segments a purchase at `now` is filled from, or why there are none.
    pub fn segments(
        &self,
        phase: Phase,
        now: Timestamp,
        policy: &SalePolicy,
    ) -> Result<Vec<Segment>, ContractError> {
        match phase {
            Phase::PreSale => Ok(policy.pre_sale_segments()),
            Phase::MainSale => {
                let elapsed = now.seconds().saturating_sub(self.ico_start.seconds());
                policy.main_sale_segments(elapsed)
            }
            Phase::NotStarted => Err(ContractError::SaleNotStarted {
                starts_at: self.pre_sale_start,
            }),
            Phase::AwaitingMainSale => Err(ContractError::MainSaleNotStarted {
                starts_at: self.ico_start,
            }),
            Phase::Succeeded | Phase::Refunding => Err(ContractError::SaleClosed {}),
            Phase::Finalized => Err(ContractError::AlreadyFinalized {}),
        }
    }
}

impl Phase {
    /// Refunds and escrow deposits are only accepted once the sale has failed.
    pub fn ensure_refunding(self) -> Result<(), ContractError> {
        match self {
            Phase::Refunding => Ok(()),
            Phase::Succeeded | Phase::Finalized => Err(ContractError::SaleSucceeded {}),
            Phase::NotStarted | Phase::PreSale | Phase::AwaitingMainSale | Phase::MainSale => {
                Err(ContractError::SaleNotClosed {})
            }
        }
    }
}
