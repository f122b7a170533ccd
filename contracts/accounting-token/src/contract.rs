#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Storage,
    Timestamp, Uint128,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::msg::{
    AllowanceResponse, BalanceResponse, ExecuteMsg, FreezingDateResponse, InstantiateMsg,
    MinterResponse, QueryMsg, ReleasedResponse, TokenInfoResponse,
};
use crate::state::{
    Control, Minting, TokenInfo, TransferGate, ALLOWANCES, BALANCES, CONTROL, TOKEN_INFO,
};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:accounting-token";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const MAX_DECIMALS: u8 = 18;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    validate_token_info(&msg)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let locked_holder = deps.api.addr_validate(&msg.locked_holder)?;
    let token = TokenInfo {
        name: msg.name,
        symbol: msg.symbol,
        decimals: msg.decimals,
        total_supply: Uint128::zero(),
    };
    TOKEN_INFO.save(deps.storage, &token)?;

    let control = Control {
        owner: info.sender.clone(),
        gate: TransferGate::Locked,
        minting: Minting::Open,
        locked_holder,
        freezing_date: msg.freezing_date.unwrap_or(Timestamp::from_seconds(0)),
    };
    CONTROL.save(deps.storage, &control)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", info.sender)
        .add_attribute("symbol", token.symbol)
        .add_attribute("locked_holder", control.locked_holder)
        .add_attribute("freezing_date", control.freezing_date.seconds().to_string()))
}

fn validate_token_info(msg: &InstantiateMsg) -> Result<(), ContractError> {
    if msg.name.trim().is_empty() {
        return Err(ContractError::InvalidTokenInfo {
            reason: "name must not be empty".to_string(),
        });
    }
    if msg.symbol.trim().is_empty() {
        return Err(ContractError::InvalidTokenInfo {
            reason: "symbol must not be empty".to_string(),
        });
    }
    if msg.decimals > MAX_DECIMALS {
        return Err(ContractError::InvalidTokenInfo {
            reason: format!("decimals must not exceed {MAX_DECIMALS}"),
        });
    }
    Ok(())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Transfer { recipient, amount } => {
            execute_transfer(deps, env, info, recipient, amount)
        }
        ExecuteMsg::Approve { spender, amount } => execute_approve(deps, info, spender, amount),
        ExecuteMsg::TransferFrom {
            owner,
            recipient,
            amount,
        } => execute_transfer_from(deps, env, info, owner, recipient, amount),
        ExecuteMsg::Mint { recipient, amount } => execute_mint(deps, info, recipient, amount),
        ExecuteMsg::FinishMinting {} => execute_finish_minting(deps, info),
        ExecuteMsg::ReleaseTokenTransfer {} => execute_release(deps, info),
        ExecuteMsg::SetFreezingDate { freezing_date } => {
            execute_set_freezing_date(deps, env, info, freezing_date)
        }
        ExecuteMsg::TransferOwnership { new_owner } => {
            execute_transfer_ownership(deps, info, new_owner)
        }
    }
}

fn move_balance(
    storage: &mut dyn Storage,
    from: &Addr,
    to: &Addr,
    amount: Uint128,
) -> Result<(), ContractError> {
    BALANCES.update(storage, from, |balance| -> Result<_, ContractError> {
        let balance = balance.unwrap_or_default();
        balance
            .checked_sub(amount)
            .map_err(|_| ContractError::InsufficientBalance {
                balance,
                required: amount,
            })
    })?;
    BALANCES.update(storage, to, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_add(amount)?)
    })?;
    Ok(())
}

pub fn execute_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }
    let control = CONTROL.load(deps.storage)?;
    control.ensure_transferable(&info.sender, &info.sender, env.block.time)?;

    let recipient = deps.api.addr_validate(&recipient)?;
    move_balance(deps.storage, &info.sender, &recipient, amount)?;

    Ok(Response::new()
        .add_attribute("action", "transfer")
        .add_attribute("from", info.sender)
        .add_attribute("to", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_approve(
    deps: DepsMut,
    info: MessageInfo,
    spender: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let spender = deps.api.addr_validate(&spender)?;
    if amount.is_zero() {
        ALLOWANCES.remove(deps.storage, (&info.sender, &spender));
    } else {
        ALLOWANCES.save(deps.storage, (&info.sender, &spender), &amount)?;
    }

    Ok(Response::new()
        .add_attribute("action", "approve")
        .add_attribute("owner", info.sender)
        .add_attribute("spender", spender)
        .add_attribute("amount", amount))
}

pub fn execute_transfer_from(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    owner: String,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }
    let owner = deps.api.addr_validate(&owner)?;
    let recipient = deps.api.addr_validate(&recipient)?;
    let control = CONTROL.load(deps.storage)?;
    control.ensure_transferable(&info.sender, &owner, env.block.time)?;

    let allowance = ALLOWANCES
        .may_load(deps.storage, (&owner, &info.sender))?
        .unwrap_or_default();
    let remaining =
        allowance
            .checked_sub(amount)
            .map_err(|_| ContractError::InsufficientAllowance {
                allowance,
                required: amount,
            })?;
    if remaining.is_zero() {
        ALLOWANCES.remove(deps.storage, (&owner, &info.sender));
    } else {
        ALLOWANCES.save(deps.storage, (&owner, &info.sender), &remaining)?;
    }
    move_balance(deps.storage, &owner, &recipient, amount)?;

    Ok(Response::new()
        .add_attribute("action", "transfer_from")
        .add_attribute("from", owner)
        .add_attribute("to", recipient)
        .add_attribute("by", info.sender)
        .add_attribute("amount", amount))
}

pub fn execute_mint(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let control = CONTROL.load(deps.storage)?;
    control.ensure_owner(&info.sender)?;
    control.minting.ensure_open()?;
    if amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }

    let recipient = deps.api.addr_validate(&recipient)?;
    TOKEN_INFO.update(deps.storage, |mut token| -> StdResult<_> {
        token.total_supply = token.total_supply.checked_add(amount)?;
        Ok(token)
    })?;
    BALANCES.update(deps.storage, &recipient, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_add(amount)?)
    })?;

    Ok(Response::new()
        .add_attribute("action", "mint")
        .add_attribute("to", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_finish_minting(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let mut control = CONTROL.load(deps.storage)?;
    control.ensure_owner(&info.sender)?;
    control.minting = control.minting.finish()?;
    CONTROL.save(deps.storage, &control)?;

    Ok(Response::new().add_attribute("action", "finish_minting"))
}

pub fn execute_release(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut control = CONTROL.load(deps.storage)?;
    control.ensure_owner(&info.sender)?;
    control.gate = control.gate.release()?;
    CONTROL.save(deps.storage, &control)?;

    Ok(Response::new().add_attribute("action", "release_token_transfer"))
}

pub fn execute_set_freezing_date(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    freezing_date: Timestamp,
) -> Result<Response, ContractError> {
    let mut control = CONTROL.load(deps.storage)?;
    control.ensure_owner(&info.sender)?;
    if freezing_date <= env.block.time {
        return Err(ContractError::FreezingDateInPast {
            date: freezing_date,
            now: env.block.time,
        });
    }
    control.freezing_date = freezing_date;
    CONTROL.save(deps.storage, &control)?;

    Ok(Response::new()
        .add_attribute("action", "set_freezing_date")
        .add_attribute("freezing_date", freezing_date.seconds().to_string()))
}

pub fn execute_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    let mut control = CONTROL.load(deps.storage)?;
    control.ensure_owner(&info.sender)?;
    control.owner = deps.api.addr_validate(&new_owner)?;
    CONTROL.save(deps.storage, &control)?;

    Ok(Response::new()
        .add_attribute("action", "transfer_ownership")
        .add_attribute("previous_owner", info.sender)
        .add_attribute("new_owner", control.owner))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::TokenInfo {} => to_json_binary(&query_token_info(deps)?),
        QueryMsg::Balance { address } => to_json_binary(&query_balance(deps, address)?),
        QueryMsg::Allowance { owner, spender } => {
            to_json_binary(&query_allowance(deps, owner, spender)?)
        }
        QueryMsg::Minter {} => to_json_binary(&query_minter(deps)?),
        QueryMsg::Released {} => to_json_binary(&query_released(deps)?),
        QueryMsg::FreezingDate {} => to_json_binary(&query_freezing_date(deps)?),
    }
}

pub fn query_token_info(deps: Deps) -> StdResult<TokenInfoResponse> {
    let token = TOKEN_INFO.load(deps.storage)?;
    Ok(TokenInfoResponse {
        name: token.name,
        symbol: token.symbol,
        decimals: token.decimals,
        total_supply: token.total_supply,
    })
}

pub fn query_balance(deps: Deps, address: String) -> StdResult<BalanceResponse> {
    let address = deps.api.addr_validate(&address)?;
    let balance = BALANCES
        .may_load(deps.storage, &address)?
        .unwrap_or_default();
    Ok(BalanceResponse { balance })
}

pub fn query_allowance(deps: Deps, owner: String, spender: String) -> StdResult<AllowanceResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let spender = deps.api.addr_validate(&spender)?;
    let allowance = ALLOWANCES
        .may_load(deps.storage, (&owner, &spender))?
        .unwrap_or_default();
    Ok(AllowanceResponse { allowance })
}

pub fn query_minter(deps: Deps) -> StdResult<MinterResponse> {
    let control = CONTROL.load(deps.storage)?;
    Ok(MinterResponse {
        minter: control.owner,
        minting_finished: control.minting == Minting::Finished,
    })
}

pub fn query_released(deps: Deps) -> StdResult<ReleasedResponse> {
    let control = CONTROL.load(deps.storage)?;
    Ok(ReleasedResponse {
        released: control.gate.is_released(),
    })
}

pub fn query_freezing_date(deps: Deps) -> StdResult<FreezingDateResponse> {
    let control = CONTROL.load(deps.storage)?;
    Ok(FreezingDateResponse {
        locked_holder: control.locked_holder,
        freezing_date: control.freezing_date,
    })
}
