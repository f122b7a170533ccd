use cosmwasm_std::{OverflowError, StdError, Timestamp, Uint128};
use thiserror::Error;

/// Coarse classification of a rejected call, shared by every contract in the
/// workspace so clients can react to a failure without matching on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks the role the operation requires.
    AccessDenied,
    /// The operation is not allowed at the current block time.
    InvalidTiming,
    /// The request itself is malformed or has no effect.
    InvalidArgument,
    /// A supply cap leaves nothing to sell.
    CapExceeded,
    /// The contract is in a state that forbids the operation.
    IneligibleState,
    /// Storage, serialization or arithmetic failure.
    Internal,
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    /// this is needed so we can use `ITEM.load(...)?` and have it auto-converted to the custom error
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Token transfers are not released yet")]
    TransfersLocked {},

    #[error("Tokens of this holder are frozen until {until}")]
    HolderFrozen { until: Timestamp },

    #[error("Freezing date {date} is not after the current block time {now}")]
    FreezingDateInPast { date: Timestamp, now: Timestamp },

    #[error("Token transfers are already released")]
    AlreadyReleased {},

    #[error("Minting is finished")]
    MintingFinished {},

    #[error("Invalid zero amount")]
    InvalidZeroAmount {},

    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Uint128, required: Uint128 },

    #[error("Insufficient allowance: {allowance} approved, {required} required")]
    InsufficientAllowance {
        allowance: Uint128,
        required: Uint128,
    },

    #[error("Invalid token info: {reason}")]
    InvalidTokenInfo { reason: String },
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Unauthorized {} => ErrorKind::AccessDenied,
            ContractError::TransfersLocked {}
            | ContractError::HolderFrozen { .. }
            | ContractError::FreezingDateInPast { .. } => ErrorKind::InvalidTiming,
            ContractError::InvalidZeroAmount {}
            | ContractError::InsufficientBalance { .. }
            | ContractError::InsufficientAllowance { .. }
            | ContractError::InvalidTokenInfo { .. } => ErrorKind::InvalidArgument,
            ContractError::AlreadyReleased {} | ContractError::MintingFinished {} => {
                ErrorKind::IneligibleState
            }
            ContractError::Std(_) | ContractError::Overflow(_) => ErrorKind::Internal,
        }
    }
}
