pub mod contract;
pub mod error;
pub mod msg;
pub mod phase;
pub mod policy;
pub mod pricing;
pub mod state;

pub use crate::error::ContractError;
