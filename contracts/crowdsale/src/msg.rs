use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};

use crate::phase::Phase;
use crate::policy::SalePolicy;

#[cw_serde]
pub struct InstantiateMsg {
    /// Token contract to mint into. Its ownership must be handed to this contract before the first purchase.
    pub token: String,
    pub beneficiary: String,
    pub denom: String,
    pub exchange_rate: Uint128,
    /// Defaults to the sender
    pub exchange_rate_provider: Option<String>,
    pub pre_sale_start: Timestamp,
    pub policy: Option<SalePolicy>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Purchase with the attached funds. Unused funds are returned.
    Buy {},
    Halt {},
    Unhalt {},
    /// Exchange rate provider only
    SetExchangeRate { rate: Uint128 },
    SetExchangeRateProvider { provider: String },
    SetPreSaleStart { start: Timestamp },
    SetIcoStart { start: Timestamp },
    Finalize {},
    /// Beneficiary only. Attached funds go to the refund escrow.
    LoadRefund {},
    Refund {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(ScheduleResponse)]
    Schedule {},
    #[returns(ExchangeRateResponse)]
    ExchangeRate {},
    #[returns(TotalsResponse)]
    Totals {},
    #[returns(InvestedAmountResponse)]
    InvestedAmount { address: String },
    #[returns(StatusResponse)]
    Status {},
    /// Previews a purchase of `amount` at the current block time
    #[returns(QuoteResponse)]
    Quote { amount: Uint128 },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: Addr,
    pub beneficiary: Addr,
    pub token: Addr,
    pub denom: String,
    pub policy: SalePolicy,
}

#[cw_serde]
pub struct ScheduleResponse {
    pub pre_sale_start: Timestamp,
    pub pre_sale_end: Timestamp,
    pub ico_start: Timestamp,
    pub ico_end: Timestamp,
}

#[cw_serde]
pub struct ExchangeRateResponse {
    pub rate: Uint128,
    pub provider: Addr,
}

#[cw_serde]
pub struct TotalsResponse {
    pub tokens_sold: Uint128,
    pub funds_raised: Uint128,
    pub funds_refunded: Uint128,
    pub investor_count: u64,
    pub refund_escrow: Uint128,
}

#[cw_serde]
pub struct InvestedAmountResponse {
    pub amount: Uint128,
}

#[cw_serde]
pub struct StatusResponse {
    pub phase: Phase,
    pub halted: bool,
    pub finalized: bool,
}

#[cw_serde]
pub struct QuoteResponse {
    pub tokens: Uint128,
    pub cost: Uint128,
    pub change: Uint128,
}
