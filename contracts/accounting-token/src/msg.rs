use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};

#[cw_serde]
pub struct InstantiateMsg {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Holder (e.g. the team reserve) whose tokens stay frozen until the freezing date
    pub locked_holder: String,
    /// Defaults to the epoch, i.e. no freeze
    pub freezing_date: Option<Timestamp>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Moves `amount` from the sender to `recipient`
    Transfer { recipient: String, amount: Uint128 },
    /// Sets the amount `spender` may move out of the sender's balance
    Approve { spender: String, amount: Uint128 },
    /// Moves `amount` from `owner` to `recipient` using the sender's allowance
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    /// Creates new tokens. Owner only.
    Mint { recipient: String, amount: Uint128 },
    /// Disables minting for good. Owner only.
    FinishMinting {},
    /// Opens transfers to all holders. Owner only, one-way.
    ReleaseTokenTransfer {},
    /// Owner only. Must lie after the current block time.
    SetFreezingDate { freezing_date: Timestamp },
    TransferOwnership { new_owner: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(TokenInfoResponse)]
    TokenInfo {},
    #[returns(BalanceResponse)]
    Balance { address: String },
    #[returns(AllowanceResponse)]
    Allowance { owner: String, spender: String },
    #[returns(MinterResponse)]
    Minter {},
    #[returns(ReleasedResponse)]
    Released {},
    #[returns(FreezingDateResponse)]
    FreezingDate {},
}

#[cw_serde]
pub struct TokenInfoResponse {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Uint128,
}

#[cw_serde]
pub struct BalanceResponse {
    pub balance: Uint128,
}

#[cw_serde]
pub struct AllowanceResponse {
    pub allowance: Uint128,
}

#[cw_serde]
pub struct MinterResponse {
    pub minter: Addr,
    pub minting_finished: bool,
}

#[cw_serde]
pub struct ReleasedResponse {
    pub released: bool,
}

#[cw_serde]
pub struct FreezingDateResponse {
    pub locked_holder: Addr,
    pub freezing_date: Timestamp,
}
