use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;
use crate::phase::Timeline;
use crate::policy::SalePolicy;

/// Fixed at instantiation
#[cw_serde]
pub struct Config {
    pub owner: Addr,
    /// Receives the raised funds and the bonus on success, funds the refund escrow on failure
    pub beneficiary: Addr,
    /// The token contract this sale mints into. The sale must own it.
    pub token: Addr,
    /// Native denom accepted as payment
    pub denom: String,
    pub policy: SalePolicy,
}

impl Config {
    pub fn ensure_owner(&self, sender: &Addr) -> Result<(), ContractError> {
        if sender != &self.owner {
            return Err(ContractError::Unauthorized {});
        }
        Ok(())
    }
}

/// Start times of both sale windows. Ends are derived from the policy durations.
#[cw_serde]
pub struct Schedule {
    pub pre_sale_start: Timestamp,
    pub ico_start: Timestamp,
}

impl Schedule {
    /// Main sale follows the pre-sale directly
    pub fn starting_at(pre_sale_start: Timestamp, policy: &SalePolicy) -> Self {
        Schedule {
            pre_sale_start,
            ico_start: pre_sale_start.plus_seconds(policy.pre_sale_duration),
        }
    }

    pub fn timeline(&self, policy: &SalePolicy) -> Timeline {
        Timeline {
            pre_sale_start: self.pre_sale_start,
            pre_sale_end: self.pre_sale_start.plus_seconds(policy.pre_sale_duration),
            ico_start: self.ico_start,
            ico_end: self.ico_start.plus_seconds(policy.main_sale_duration),
        }
    }
}

#[cw_serde]
pub struct ExchangeRate {
    /// Quote minor units per whole native coin
    pub rate: Uint128,
    /// The only address allowed to update `rate`
    pub provider: Addr,
}

/// Aggregate counters. None of them ever decreases except the escrow balance.
#[cw_serde]
#[derive(Default)]
pub struct Totals {
    pub tokens_sold: Uint128,
    pub funds_raised: Uint128,
    pub funds_refunded: Uint128,
    pub investor_count: u64,
    pub refund_escrow: Uint128,
}

/// Emergency switch of the purchase entry point
#[cw_serde]
#[derive(Copy, Eq)]
pub enum RunState {
    Running,
    Halted,
}

impl RunState {
    pub fn halt(self) -> Self {
        RunState::Halted
    }

    pub fn unhalt(self) -> Result<Self, ContractError> {
        match self {
            RunState::Halted => Ok(RunState::Running),
            RunState::Running => Err(ContractError::NotHalted {}),
        }
    }

    pub fn ensure_running(self) -> Result<(), ContractError> {
        match self {
            RunState::Running => Ok(()),
            RunState::Halted => Err(ContractError::Halted {}),
        }
    }

    pub fn is_halted(self) -> bool {
        self == RunState::Halted
    }
}

/// Only ever goes from `Open` to `Finalized`
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Settlement {
    Open,
    Finalized,
}

impl Settlement {
    pub fn finalize(self) -> Result<Self, ContractError> {
        match self {
            Settlement::Open => Ok(Settlement::Finalized),
            Settlement::Finalized => Err(ContractError::AlreadyFinalized {}),
        }
    }

    pub fn is_finalized(self) -> bool {
        self == Settlement::Finalized
    }
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const SCHEDULE: Item<Schedule> = Item::new("schedule");
pub const EXCHANGE_RATE: Item<ExchangeRate> = Item::new("exchange_rate");
pub const TOTALS: Item<Totals> = Item::new("totals");
pub const RUN_STATE: Item<RunState> = Item::new("run_state");
pub const SETTLEMENT: Item<Settlement> = Item::new("settlement");
/// Net contribution per investor, zeroed once refunded
pub const INVESTED: Map<&Addr, Uint128> = Map::new("invested");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DAY, WEEK};

    #[test]
    fn schedule_derives_window_ends() {
        let policy = SalePolicy::default();
        let start = Timestamp::from_seconds(1_000);
        let timeline = Schedule::starting_at(start, &policy).timeline(&policy);
        assert_eq!(timeline.pre_sale_end, start.plus_seconds(14 * DAY));
        assert_eq!(timeline.ico_start, start.plus_seconds(14 * DAY));
        assert_eq!(timeline.ico_end, start.plus_seconds(6 * WEEK));
    }

    #[test]
    fn halt_switch_transitions() {
        assert_eq!(RunState::Running.halt(), RunState::Halted);
        // halting twice is harmless
        assert_eq!(RunState::Halted.halt(), RunState::Halted);
        assert_eq!(RunState::Halted.unhalt().unwrap(), RunState::Running);
        assert_eq!(
            RunState::Running.unhalt().unwrap_err(),
            ContractError::NotHalted {}
        );
        assert_eq!(
            RunState::Halted.ensure_running().unwrap_err(),
            ContractError::Halted {}
        );
    }

    #[test]
    fn settlement_is_one_way() {
        let settled = Settlement::Open.finalize().unwrap();
        assert!(settled.is_finalized());
        assert_eq!(
            settled.finalize().unwrap_err(),
            ContractError::AlreadyFinalized {}
        );
    }
}
