use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;

#[cw_serde]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Uint128,
}

/// Whether ordinary holders may move their balances. Only ever goes
/// from `Locked` to `Released`.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum TransferGate {
    Locked,
    Released,
}

impl TransferGate {
    pub fn release(self) -> Result<Self, ContractError> {
        match self {
            TransferGate::Locked => Ok(TransferGate::Released),
            TransferGate::Released => Err(ContractError::AlreadyReleased {}),
        }
    }

    pub fn is_released(self) -> bool {
        self == TransferGate::Released
    }
}

/// Supply switch of the minter role. Only ever goes from `Open` to `Finished`.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Minting {
    Open,
    Finished,
}

impl Minting {
    pub fn ensure_open(self) -> Result<(), ContractError> {
        match self {
            Minting::Open => Ok(()),
            Minting::Finished => Err(ContractError::MintingFinished {}),
        }
    }

    pub fn finish(self) -> Result<Self, ContractError> {
        self.ensure_open()?;
        Ok(Minting::Finished)
    }
}

#[cw_serde]
pub struct Control {
    /// Owner of the token. Also the only minter.
    pub owner: Addr,
    pub gate: TransferGate,
    pub minting: Minting,
    /// The holder whose outgoing transfers stay frozen until `freezing_date`.
    pub locked_holder: Addr,
    pub freezing_date: Timestamp,
}

impl Control {
    pub fn ensure_owner(&self, sender: &Addr) -> Result<(), ContractError> {
        if sender != &self.owner {
            return Err(ContractError::Unauthorized {});
        }
        Ok(())
    }

    /// Decides whether `sender` may move tokens out of `from` at `now`.
    ///
    /// Before release only the owner moves balances (pre-launch allocation).
    /// The locked holder stays frozen until the freezing date in any case.
    pub fn ensure_transferable(
        &self,
        sender: &Addr,
        from: &Addr,
        now: Timestamp,
    ) -> Result<(), ContractError> {
        if !self.gate.is_released() && sender != &self.owner {
            return Err(ContractError::TransfersLocked {});
        }
        if from == &self.locked_holder && now < self.freezing_date {
            return Err(ContractError::HolderFrozen {
                until: self.freezing_date,
            });
        }
        Ok(())
    }
}

pub const TOKEN_INFO: Item<TokenInfo> = Item::new("token_info");
pub const CONTROL: Item<Control> = Item::new("control");
pub const BALANCES: Map<&Addr, Uint128> = Map::new("balance");
/// (owner, spender) -> approved amount
pub const ALLOWANCES: Map<(&Addr, &Addr), Uint128> = Map::new("allowance");

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> Control {
        Control {
            owner: Addr::unchecked("owner"),
            gate: TransferGate::Locked,
            minting: Minting::Open,
            locked_holder: Addr::unchecked("team"),
            freezing_date: Timestamp::from_seconds(1_000),
        }
    }

    #[test]
    fn gate_releases_once() {
        let gate = TransferGate::Locked.release().unwrap();
        assert!(gate.is_released());
        assert_eq!(gate.release().unwrap_err(), ContractError::AlreadyReleased {});
    }

    #[test]
    fn minting_finishes_once() {
        let minting = Minting::Open.finish().unwrap();
        assert_eq!(minting, Minting::Finished);
        assert_eq!(minting.finish().unwrap_err(), ContractError::MintingFinished {});
        assert_eq!(
            minting.ensure_open().unwrap_err(),
            ContractError::MintingFinished {}
        );
    }

    #[test]
    fn only_owner_moves_tokens_before_release() {
        let control = control();
        let alice = Addr::unchecked("alice");
        let now = Timestamp::from_seconds(5_000);

        let err = control.ensure_transferable(&alice, &alice, now).unwrap_err();
        assert_eq!(err, ContractError::TransfersLocked {});
        control
            .ensure_transferable(&control.owner, &control.owner, now)
            .unwrap();
    }

    #[test]
    fn locked_holder_frozen_until_date() {
        let mut control = control();
        control.gate = TransferGate::Released;
        let team = control.locked_holder.clone();

        let err = control
            .ensure_transferable(&team, &team, Timestamp::from_seconds(999))
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::HolderFrozen {
                until: Timestamp::from_seconds(1_000)
            }
        );
        // a spender cannot drain the frozen holder either
        let spender = Addr::unchecked("spender");
        control
            .ensure_transferable(&spender, &team, Timestamp::from_seconds(999))
            .unwrap_err();

        control
            .ensure_transferable(&team, &team, Timestamp::from_seconds(1_000))
            .unwrap();
        let alice = Addr::unchecked("alice");
        control
            .ensure_transferable(&alice, &alice, Timestamp::from_seconds(999))
            .unwrap();
    }
}
