use accounting_token::ErrorKind;
use cosmwasm_std::{
    CheckedMultiplyRatioError, ConversionOverflowError, DivideByZeroError, OverflowError,
    StdError, Timestamp, Uint128,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    /// this is needed so we can use `ITEM.load(...)?` and have it auto-converted to the custom error
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    DivideByZero(#[from] DivideByZeroError),

    #[error("{0}")]
    ConversionOverflow(#[from] ConversionOverflowError),

    #[error("{0}")]
    MultiplyRatio(#[from] CheckedMultiplyRatioError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Sale is halted")]
    Halted {},

    #[error("Sale is not halted")]
    NotHalted {},

    #[error("Sale starts at {starts_at}")]
    SaleNotStarted { starts_at: Timestamp },

    #[error("Pre-sale is over, main sale starts at {starts_at}")]
    MainSaleNotStarted { starts_at: Timestamp },

    #[error("Sale is closed")]
    SaleClosed {},

    #[error("Pre-sale already started at {started_at}")]
    PreSaleAlreadyStarted { started_at: Timestamp },

    #[error("Main sale already started at {started_at}")]
    MainSaleAlreadyStarted { started_at: Timestamp },

    #[error("Main sale cannot start at {requested} before the pre-sale ends at {pre_sale_end}")]
    MainSaleBeforePreSaleEnd {
        requested: Timestamp,
        pre_sale_end: Timestamp,
    },

    #[error("Start time {requested} lies before the current block time {now}")]
    StartInPast { requested: Timestamp, now: Timestamp },

    #[error("Exchange rate must not be zero")]
    ZeroExchangeRate {},

    #[error("No funds sent")]
    NoFunds {},

    #[error("Only {denom} is accepted")]
    WrongDenom { denom: String },

    #[error("Purchase below the minimum of {min} token units")]
    BelowMinimumPurchase { min: Uint128 },

    #[error("Token cap of {cap} units is exhausted")]
    CapExceeded { cap: Uint128 },

    #[error("Nothing to refund")]
    NothingToRefund {},

    #[error("Sale is already finalized")]
    AlreadyFinalized {},

    #[error("Soft cap of {soft_cap} token units not reached, {tokens_sold} sold")]
    SoftCapNotReached {
        soft_cap: Uint128,
        tokens_sold: Uint128,
    },

    #[error("Sale reached its soft cap, no refunds")]
    SaleSucceeded {},

    #[error("Sale is not closed yet")]
    SaleNotClosed {},

    #[error("Refund escrow holds {available}, {required} required")]
    EscrowUnderfunded {
        available: Uint128,
        required: Uint128,
    },

    #[error("Invalid sale policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl ContractError {
    pub(crate) fn invalid_policy(reason: impl Into<String>) -> Self {
        ContractError::InvalidPolicy {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use ContractError::*;

        match self {
            Unauthorized {} => ErrorKind::AccessDenied,
            Halted {}
            | SaleNotStarted { .. }
            | MainSaleNotStarted { .. }
            | SaleClosed {}
            | PreSaleAlreadyStarted { .. }
            | MainSaleAlreadyStarted { .. }
            | MainSaleBeforePreSaleEnd { .. }
            | StartInPast { .. } => ErrorKind::InvalidTiming,
            ZeroExchangeRate {}
            | NoFunds {}
            | WrongDenom { .. }
            | BelowMinimumPurchase { .. }
            | NothingToRefund {}
            | InvalidPolicy { .. } => ErrorKind::InvalidArgument,
            CapExceeded { .. } => ErrorKind::CapExceeded,
            NotHalted {}
            | AlreadyFinalized {}
            | SoftCapNotReached { .. }
            | SaleSucceeded {}
            | SaleNotClosed {}
            | EscrowUnderfunded { .. } => ErrorKind::IneligibleState,
            Std(_) | Overflow(_) | DivideByZero(_) | ConversionOverflow(_) | MultiplyRatio(_) => {
                ErrorKind::Internal
            }
        }
    }
}
