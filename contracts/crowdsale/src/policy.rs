use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;
use crate::pricing::Segment;

pub const DAY: u64 = 24 * 60 * 60;
pub const WEEK: u64 = 7 * DAY;

const MAX_DECIMALS: u32 = 18;

/// Pre-sale price that applies while the cumulative tokens sold stay below `up_to`.
#[cw_serde]
pub struct VolumeTier {
    pub up_to: Uint128,
    pub price: Uint128,
}

/// Main sale price that applies from `from_offset` seconds after the main sale start.
#[cw_serde]
pub struct TimeTier {
    pub from_offset: u64,
    pub price: Uint128,
}

/// Policy constants of a sale. Token amounts and caps are in token base units,
/// prices in quote minor units per whole token.
#[cw_serde]
pub struct SalePolicy {
    pub token_decimals: u32,
    pub native_decimals: u32,
    /// Seconds
    pub pre_sale_duration: u64,
    /// Seconds
    pub main_sale_duration: u64,
    /// Ordered by `up_to`. The last tier ends at the pre-sale hard cap.
    pub pre_sale_tiers: Vec<VolumeTier>,
    /// A pre-sale that ends below this amount fails the whole sale
    pub pre_sale_soft_cap: Uint128,
    pub pre_sale_hard_cap: Uint128,
    /// Ordered by `from_offset`. The first tier starts at offset 0.
    pub main_sale_ladder: Vec<TimeTier>,
    pub soft_cap: Uint128,
    pub hard_cap: Uint128,
    /// Share of the tokens sold minted to the beneficiary on finalize
    pub bonus_percent: u64,
}

impl Default for SalePolicy {
    fn default() -> Self {
        let tokens = |whole: u128| Uint128::new(whole * 10_000);

        SalePolicy {
            token_decimals: 4,
            native_decimals: 18,
            pre_sale_duration: 2 * WEEK,
            main_sale_duration: 4 * WEEK,
            pre_sale_tiers: vec![
                VolumeTier {
                    up_to: tokens(35_000),
                    price: Uint128::new(68),
                },
                VolumeTier {
                    up_to: tokens(100_000),
                    price: Uint128::new(80),
                },
            ],
            pre_sale_soft_cap: tokens(40_000),
            pre_sale_hard_cap: tokens(100_000),
            main_sale_ladder: vec![
                TimeTier {
                    from_offset: 0,
                    price: Uint128::new(90),
                },
                TimeTier {
                    from_offset: WEEK,
                    price: Uint128::new(100),
                },
                TimeTier {
                    from_offset: 3 * WEEK,
                    price: Uint128::new(110),
                },
            ],
            soft_cap: tokens(1_000_000),
            hard_cap: tokens(4_000_000),
            bonus_percent: 10,
        }
    }
}

impl SalePolicy {
    /// Base units of one whole token, which is also the minimum purchase.
    pub fn token_unit(&self) -> Uint128 {
        Uint128::new(10u128.pow(self.token_decimals))
    }

    /// Base units of one whole native coin.
    pub fn native_unit(&self) -> Uint128 {
        Uint128::new(10u128.pow(self.native_decimals))
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        if self.token_decimals > MAX_DECIMALS || self.native_decimals > MAX_DECIMALS {
            return Err(ContractError::invalid_policy(format!(
                "decimals must not exceed {MAX_DECIMALS}"
            )));
        }
        if self.pre_sale_duration == 0 || self.main_sale_duration == 0 {
            return Err(ContractError::invalid_policy("durations must not be zero"));
        }
        if self.hard_cap.is_zero() {
            return Err(ContractError::invalid_policy("hard cap must not be zero"));
        }
        if self.pre_sale_soft_cap > self.pre_sale_hard_cap {
            return Err(ContractError::invalid_policy(
                "pre-sale soft cap exceeds pre-sale hard cap",
            ));
        }
        if self.pre_sale_hard_cap > self.hard_cap {
            return Err(ContractError::invalid_policy(
                "pre-sale hard cap exceeds hard cap",
            ));
        }
        if self.pre_sale_soft_cap > self.soft_cap {
            return Err(ContractError::invalid_policy(
                "pre-sale soft cap exceeds soft cap",
            ));
        }
        if self.soft_cap > self.hard_cap {
            return Err(ContractError::invalid_policy("soft cap exceeds hard cap"));
        }
        if self.bonus_percent > 100 {
            return Err(ContractError::invalid_policy(
                "bonus must not exceed 100 percent",
            ));
        }
        self.validate_pre_sale_tiers()?;
        self.validate_main_sale_ladder()
    }

    fn validate_pre_sale_tiers(&self) -> Result<(), ContractError> {
        let last = self
            .pre_sale_tiers
            .last()
            .ok_or_else(|| ContractError::invalid_policy("pre-sale tiers must not be empty"))?;
        if self.pre_sale_tiers.iter().any(|tier| tier.price.is_zero()) {
            return Err(ContractError::invalid_policy("prices must not be zero"));
        }
        if self
            .pre_sale_tiers
            .windows(2)
            .any(|pair| pair[0].up_to >= pair[1].up_to)
        {
            return Err(ContractError::invalid_policy(
                "pre-sale tiers must be strictly ascending",
            ));
        }
        if last.up_to != self.pre_sale_hard_cap {
            return Err(ContractError::invalid_policy(
                "last pre-sale tier must end at the pre-sale hard cap",
            ));
        }
        Ok(())
    }

    fn validate_main_sale_ladder(&self) -> Result<(), ContractError> {
        let first = self
            .main_sale_ladder
            .first()
            .ok_or_else(|| ContractError::invalid_policy("main sale ladder must not be empty"))?;
        if first.from_offset != 0 {
            return Err(ContractError::invalid_policy(
                "main sale ladder must start at offset 0",
            ));
        }
        if self.main_sale_ladder.iter().any(|tier| tier.price.is_zero()) {
            return Err(ContractError::invalid_policy("prices must not be zero"));
        }
        if self
            .main_sale_ladder
            .windows(2)
            .any(|pair| pair[0].from_offset >= pair[1].from_offset)
        {
            return Err(ContractError::invalid_policy(
                "main sale ladder must be strictly ascending",
            ));
        }
        if self
            .main_sale_ladder
            .iter()
            .any(|tier| tier.from_offset >= self.main_sale_duration)
        {
            return Err(ContractError::invalid_policy(
                "main sale ladder step lies after the main sale end",
            ));
        }
        Ok(())
    }

    pub fn pre_sale_segments(&self) -> Vec<Segment> {
        self.pre_sale_tiers
            .iter()
            .map(|tier| Segment {
                until: tier.up_to,
                price: tier.price,
            })
            .collect()
    }

    /// Price of the ladder step reached `elapsed` seconds into the main sale.
    pub fn main_sale_price(&self, elapsed: u64) -> Result<Uint128, ContractError> {
        self.main_sale_ladder
            .iter()
            .rev()
            .find(|tier| tier.from_offset <= elapsed)
            .map(|tier| tier.price)
            .ok_or_else(|| ContractError::invalid_policy("main sale ladder must not be empty"))
    }

    pub fn main_sale_segments(&self, elapsed: u64) -> Result<Vec<Segment>, ContractError> {
        Ok(vec![Segment {
            until: self.hard_cap,
            price: self.main_sale_price(elapsed)?,
        }])
    }

    pub fn bonus_for(&self, tokens_sold: Uint128) -> Result<Uint128, ContractError> {
        Ok(tokens_sold.checked_multiply_ratio(self.bonus_percent, 100u64)?)
    }
}
