use accounting_token::msg::{
    BalanceResponse as TokenBalanceResponse, ExecuteMsg as TokenExecuteMsg,
    QueryMsg as TokenQueryMsg,
};
#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Env, Event,
    MessageInfo, Response, StdError, StdResult, Storage, Timestamp, Uint128, WasmMsg,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExchangeRateResponse, ExecuteMsg, InstantiateMsg, InvestedAmountResponse,
    QueryMsg, QuoteResponse, ScheduleResponse, StatusResponse, TotalsResponse,
};
use crate::phase::{Phase, Timeline};
use crate::policy::SalePolicy;
use crate::pricing::{price_purchase, Converter, Quote, Segment};
use crate::state::{
    Config, ExchangeRate, RunState, Schedule, Settlement, Totals, CONFIG, EXCHANGE_RATE,
    INVESTED, RUN_STATE, SCHEDULE, SETTLEMENT, TOTALS,
};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:crowdsale";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let policy = msg.policy.unwrap_or_default();
    policy.validate()?;
    if msg.exchange_rate.is_zero() {
        return Err(ContractError::ZeroExchangeRate {});
    }
    if msg.denom.trim().is_empty() {
        return Err(ContractError::invalid_policy("denom must not be empty"));
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let provider = match msg.exchange_rate_provider {
        Some(provider) => deps.api.addr_validate(&provider)?,
        None => info.sender.clone(),
    };
    let schedule = Schedule::starting_at(msg.pre_sale_start, &policy);
    let config = Config {
        owner: info.sender,
        beneficiary: deps.api.addr_validate(&msg.beneficiary)?,
        token: deps.api.addr_validate(&msg.token)?,
        denom: msg.denom,
        policy,
    };

    CONFIG.save(deps.storage, &config)?;
    SCHEDULE.save(deps.storage, &schedule)?;
    EXCHANGE_RATE.save(
        deps.storage,
        &ExchangeRate {
            rate: msg.exchange_rate,
            provider,
        },
    )?;
    TOTALS.save(deps.storage, &Totals::default())?;
    RUN_STATE.save(deps.storage, &RunState::Running)?;
    SETTLEMENT.save(deps.storage, &Settlement::Open)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", config.owner)
        .add_attribute("beneficiary", config.beneficiary)
        .add_attribute("token", config.token)
        .add_attribute("pre_sale_start", schedule.pre_sale_start.seconds().to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Buy {} => execute_buy(deps, env, info),
        ExecuteMsg::Halt {} => execute_halt(deps, info),
        ExecuteMsg::Unhalt {} => execute_unhalt(deps, info),
        ExecuteMsg::SetExchangeRate { rate } => execute_set_exchange_rate(deps, info, rate),
        ExecuteMsg::SetExchangeRateProvider { provider } => {
            execute_set_exchange_rate_provider(deps, info, provider)
        }
        ExecuteMsg::SetPreSaleStart { start } => execute_set_pre_sale_start(deps, env, info, start),
        ExecuteMsg::SetIcoStart { start } => execute_set_ico_start(deps, env, info, start),
        ExecuteMsg::Finalize {} => execute_finalize(deps, env, info),
        ExecuteMsg::LoadRefund {} => execute_load_refund(deps, env, info),
        ExecuteMsg::Refund {} => execute_refund(deps, env, info),
    }
}

/// Exactly one non-zero coin of the sale denom
fn must_pay(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    match &*info.funds {
        [] => Err(ContractError::NoFunds {}),
        [coin] if coin.denom == denom => {
            if coin.amount.is_zero() {
                Err(ContractError::NoFunds {})
            } else {
                Ok(coin.amount)
            }
        }
        _ => Err(ContractError::WrongDenom {
            denom: denom.to_string(),
        }),
    }
}

fn current_phase(
    storage: &dyn Storage,
    policy: &SalePolicy,
    tokens_sold: Uint128,
    now: Timestamp,
) -> StdResult<(Timeline, Phase)> {
    let timeline = SCHEDULE.load(storage)?.timeline(policy);
    let finalized = SETTLEMENT.load(storage)?.is_finalized();
    Ok((timeline, timeline.phase(now, tokens_sold, policy, finalized)))
}

/// Price segments open to a purchase right now
fn purchase_segments(
    storage: &dyn Storage,
    policy: &SalePolicy,
    tokens_sold: Uint128,
    now: Timestamp,
) -> Result<Vec<Segment>, ContractError> {
    RUN_STATE.load(storage)?.ensure_running()?;
    let (timeline, phase) = current_phase(storage, policy, tokens_sold, now)?;
    timeline.segments(phase, now, policy)
}

fn price_at_current_rate(
    storage: &dyn Storage,
    policy: &SalePolicy,
    segments: &[Segment],
    tokens_sold: Uint128,
    value: Uint128,
) -> Result<Quote, ContractError> {
    let rate = EXCHANGE_RATE.load(storage)?.rate;
    let converter = Converter::new(rate, policy);
    price_purchase(&converter, segments, tokens_sold, value, policy.token_unit())
}

pub fn execute_buy(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut totals = TOTALS.load(deps.storage)?;
    let segments = purchase_segments(
        deps.storage,
        &config.policy,
        totals.tokens_sold,
        env.block.time,
    )?;
    let value = must_pay(&info, &config.denom)?;
    let quote = price_at_current_rate(
        deps.storage,
        &config.policy,
        &segments,
        totals.tokens_sold,
        value,
    )?;

    for fill in &quote.fills {
        deps.api.debug(&format!(
            "purchase fill: {} units at {} for {}",
            fill.tokens, fill.price, fill.cost
        ));
    }

    let invested = INVESTED.may_load(deps.storage, &info.sender)?;
    if invested.is_none() {
        totals.investor_count += 1;
    }
    let invested = invested.unwrap_or_default().checked_add(quote.cost)?;
    totals.tokens_sold = totals.tokens_sold.checked_add(quote.tokens)?;
    totals.funds_raised = totals.funds_raised.checked_add(quote.cost)?;
    INVESTED.save(deps.storage, &info.sender, &invested)?;
    TOTALS.save(deps.storage, &totals)?;

    let mint = TokenExecuteMsg::Mint {
        recipient: info.sender.to_string(),
        amount: quote.tokens,
    };
    // raised funds go straight to the beneficiary, refunds are paid from the escrow
    let mut messages = vec![
        token_execute(&config.token, &mint)?,
        BankMsg::Send {
            to_address: config.beneficiary.to_string(),
            amount: coins(quote.cost.u128(), &config.denom),
        }
        .into(),
    ];
    if !quote.change.is_zero() {
        messages.push(
            BankMsg::Send {
                to_address: info.sender.to_string(),
                amount: coins(quote.change.u128(), &config.denom),
            }
            .into(),
        );
    }

    let event = Event::new("purchase")
        .add_attribute("buyer", info.sender.as_str())
        .add_attribute("tokens", quote.tokens)
        .add_attribute("cost", quote.cost)
        .add_attribute("change", quote.change);

    Ok(Response::new()
        .add_messages(messages)
        .add_event(event)
        .add_attribute("action", "buy")
        .add_attribute("buyer", info.sender)
        .add_attribute("tokens_sold", totals.tokens_sold))
}

pub fn execute_halt(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    CONFIG.load(deps.storage)?.ensure_owner(&info.sender)?;
    let state = RUN_STATE.load(deps.storage)?.halt();
    RUN_STATE.save(deps.storage, &state)?;

    Ok(Response::new().add_attribute("action", "halt"))
}

pub fn execute_unhalt(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    CONFIG.load(deps.storage)?.ensure_owner(&info.sender)?;
    let state = RUN_STATE.load(deps.storage)?.unhalt()?;
    RUN_STATE.save(deps.storage, &state)?;

    Ok(Response::new().add_attribute("action", "unhalt"))
}

pub fn execute_set_exchange_rate(
    deps: DepsMut,
    info: MessageInfo,
    rate: Uint128,
) -> Result<Response, ContractError> {
    let mut exchange_rate = EXCHANGE_RATE.load(deps.storage)?;
    if info.sender != exchange_rate.provider {
        return Err(ContractError::Unauthorized {});
    }
    if rate.is_zero() {
        return Err(ContractError::ZeroExchangeRate {});
    }
    exchange_rate.rate = rate;
    EXCHANGE_RATE.save(deps.storage, &exchange_rate)?;

    Ok(Response::new()
        .add_attribute("action", "set_exchange_rate")
        .add_attribute("rate", rate))
}

pub fn execute_set_exchange_rate_provider(
    deps: DepsMut,
    info: MessageInfo,
    provider: String,
) -> Result<Response, ContractError> {
    CONFIG.load(deps.storage)?.ensure_owner(&info.sender)?;
    let provider = deps.api.addr_validate(&provider)?;
    EXCHANGE_RATE.update(deps.storage, |mut exchange_rate| -> StdResult<_> {
        exchange_rate.provider = provider.clone();
        Ok(exchange_rate)
    })?;

    Ok(Response::new()
        .add_attribute("action", "set_exchange_rate_provider")
        .add_attribute("provider", provider))
}

pub fn execute_set_pre_sale_start(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    start: Timestamp,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    config.ensure_owner(&info.sender)?;
    let schedule = SCHEDULE.load(deps.storage)?;
    let now = env.block.time;
    if now >= schedule.pre_sale_start {
        return Err(ContractError::PreSaleAlreadyStarted {
            started_at: schedule.pre_sale_start,
        });
    }
    if start < now {
        return Err(ContractError::StartInPast {
            requested: start,
            now,
        });
    }

    let schedule = Schedule::starting_at(start, &config.policy);
    SCHEDULE.save(deps.storage, &schedule)?;

    Ok(Response::new()
        .add_attribute("action", "set_pre_sale_start")
        .add_attribute("pre_sale_start", start.seconds().to_string())
        .add_attribute("ico_start", schedule.ico_start.seconds().to_string()))
}

pub fn execute_set_ico_start(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    start: Timestamp,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    config.ensure_owner(&info.sender)?;
    let mut schedule = SCHEDULE.load(deps.storage)?;
    let timeline = schedule.timeline(&config.policy);
    let now = env.block.time;
    if now >= timeline.ico_start {
        return Err(ContractError::MainSaleAlreadyStarted {
            started_at: timeline.ico_start,
        });
    }
    if start < now {
        return Err(ContractError::StartInPast {
            requested: start,
            now,
        });
    }
    if start < timeline.pre_sale_end {
        return Err(ContractError::MainSaleBeforePreSaleEnd {
            requested: start,
            pre_sale_end: timeline.pre_sale_end,
        });
    }

    schedule.ico_start = start;
    SCHEDULE.save(deps.storage, &schedule)?;

    Ok(Response::new()
        .add_attribute("action", "set_ico_start")
        .add_attribute("ico_start", start.seconds().to_string()))
}

/// Closes a successful sale. Mints the bonus, moves every token and any coins the sale
/// still holds to the beneficiary, then returns the token to the owner.
pub fn execute_finalize(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    config.ensure_owner(&info.sender)?;
    let settlement = SETTLEMENT.load(deps.storage)?.finalize()?;
    let totals = TOTALS.load(deps.storage)?;
    if totals.tokens_sold < config.policy.soft_cap {
        return Err(ContractError::SoftCapNotReached {
            soft_cap: config.policy.soft_cap,
            tokens_sold: totals.tokens_sold,
        });
    }
    let bonus = config.policy.bonus_for(totals.tokens_sold)?;
    SETTLEMENT.save(deps.storage, &settlement)?;

    let held: TokenBalanceResponse = deps.querier.query_wasm_smart(
        &config.token,
        &TokenQueryMsg::Balance {
            address: env.contract.address.to_string(),
        },
    )?;
    let funds = deps
        .querier
        .query_balance(&env.contract.address, &config.denom)?;

    let beneficiary = config.beneficiary.to_string();
    let mut token_msgs = vec![];
    if !bonus.is_zero() {
        token_msgs.push(TokenExecuteMsg::Mint {
            recipient: beneficiary.clone(),
            amount: bonus,
        });
    }
    if !held.balance.is_zero() {
        token_msgs.push(TokenExecuteMsg::Transfer {
            recipient: beneficiary.clone(),
            amount: held.balance,
        });
    }
    token_msgs.push(TokenExecuteMsg::FinishMinting {});
    token_msgs.push(TokenExecuteMsg::TransferOwnership {
        new_owner: config.owner.to_string(),
    });

    let mut messages = token_msgs
        .iter()
        .map(|msg| token_execute(&config.token, msg))
        .collect::<StdResult<Vec<CosmosMsg>>>()?;
    if !funds.amount.is_zero() {
        messages.push(
            BankMsg::Send {
                to_address: beneficiary,
                amount: vec![funds.clone()],
            }
            .into(),
        );
    }

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("action", "finalize")
        .add_attribute("tokens_sold", totals.tokens_sold)
        .add_attribute("bonus", bonus)
        .add_attribute("forwarded", funds.amount))
}

fn token_execute(token: &Addr, msg: &TokenExecuteMsg) -> StdResult<CosmosMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }
    .into())
}

pub fn execute_load_refund(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.beneficiary {
        return Err(ContractError::Unauthorized {});
    }
    let mut totals = TOTALS.load(deps.storage)?;
    let (_, phase) = current_phase(
        deps.storage,
        &config.policy,
        totals.tokens_sold,
        env.block.time,
    )?;
    phase.ensure_refunding()?;
    let amount = must_pay(&info, &config.denom)?;

    totals.refund_escrow = totals.refund_escrow.checked_add(amount)?;
    TOTALS.save(deps.storage, &totals)?;

    Ok(Response::new()
        .add_attribute("action", "load_refund")
        .add_attribute("amount", amount)
        .add_attribute("refund_escrow", totals.refund_escrow))
}

pub fn execute_refund(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut totals = TOTALS.load(deps.storage)?;
    let (_, phase) = current_phase(
        deps.storage,
        &config.policy,
        totals.tokens_sold,
        env.block.time,
    )?;
    phase.ensure_refunding()?;

    let amount = INVESTED
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    if amount.is_zero() {
        return Err(ContractError::NothingToRefund {});
    }
    if totals.refund_escrow < amount {
        return Err(ContractError::EscrowUnderfunded {
            available: totals.refund_escrow,
            required: amount,
        });
    }

    totals.refund_escrow = totals.refund_escrow.checked_sub(amount)?;
    totals.funds_refunded = totals.funds_refunded.checked_add(amount)?;
    INVESTED.save(deps.storage, &info.sender, &Uint128::zero())?;
    TOTALS.save(deps.storage, &totals)?;

    let event = Event::new("refund")
        .add_attribute("investor", info.sender.as_str())
        .add_attribute("amount", amount);

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(amount.u128(), &config.denom),
        })
        .add_event(event)
        .add_attribute("action", "refund")
        .add_attribute("investor", info.sender)
        .add_attribute("amount", amount))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Schedule {} => to_json_binary(&query_schedule(deps)?),
        QueryMsg::ExchangeRate {} => to_json_binary(&query_exchange_rate(deps)?),
        QueryMsg::Totals {} => to_json_binary(&query_totals(deps)?),
        QueryMsg::InvestedAmount { address } => {
            to_json_binary(&query_invested_amount(deps, address)?)
        }
        QueryMsg::Status {} => to_json_binary(&query_status(deps, env)?),
        QueryMsg::Quote { amount } => to_json_binary(&query_quote(deps, env, amount)?),
    }
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: config.owner,
        beneficiary: config.beneficiary,
        token: config.token,
        denom: config.denom,
        policy: config.policy,
    })
}

pub fn query_schedule(deps: Deps) -> StdResult<ScheduleResponse> {
    let config = CONFIG.load(deps.storage)?;
    let timeline = SCHEDULE.load(deps.storage)?.timeline(&config.policy);
    Ok(ScheduleResponse {
        pre_sale_start: timeline.pre_sale_start,
        pre_sale_end: timeline.pre_sale_end,
        ico_start: timeline.ico_start,
        ico_end: timeline.ico_end,
    })
}

pub fn query_exchange_rate(deps: Deps) -> StdResult<ExchangeRateResponse> {
    let exchange_rate = EXCHANGE_RATE.load(deps.storage)?;
    Ok(ExchangeRateResponse {
        rate: exchange_rate.rate,
        provider: exchange_rate.provider,
    })
}

pub fn query_totals(deps: Deps) -> StdResult<TotalsResponse> {
    let totals = TOTALS.load(deps.storage)?;
    Ok(TotalsResponse {
        tokens_sold: totals.tokens_sold,
        funds_raised: totals.funds_raised,
        funds_refunded: totals.funds_refunded,
        investor_count: totals.investor_count,
        refund_escrow: totals.refund_escrow,
    })
}

pub fn query_invested_amount(deps: Deps, address: String) -> StdResult<InvestedAmountResponse> {
    let address = deps.api.addr_validate(&address)?;
    let amount = INVESTED
        .may_load(deps.storage, &address)?
        .unwrap_or_default();
    Ok(InvestedAmountResponse { amount })
}

pub fn query_status(deps: Deps, env: Env) -> StdResult<StatusResponse> {
    let config = CONFIG.load(deps.storage)?;
    let totals = TOTALS.load(deps.storage)?;
    let (_, phase) = current_phase(
        deps.storage,
        &config.policy,
        totals.tokens_sold,
        env.block.time,
    )?;
    Ok(StatusResponse {
        phase,
        halted: RUN_STATE.load(deps.storage)?.is_halted(),
        finalized: phase == Phase::Finalized,
    })
}

pub fn query_quote(deps: Deps, env: Env, amount: Uint128) -> StdResult<QuoteResponse> {
    let config = CONFIG.load(deps.storage)?;
    let totals = TOTALS.load(deps.storage)?;
    let quote = purchase_segments(
        deps.storage,
        &config.policy,
        totals.tokens_sold,
        env.block.time,
    )
    .and_then(|segments| {
        price_at_current_rate(
            deps.storage,
            &config.policy,
            &segments,
            totals.tokens_sold,
            amount,
        )
    })
    .map_err(|err| StdError::generic_err(err.to_string()))?;
    Ok(QuoteResponse {
        tokens: quote.tokens,
        cost: quote.cost,
        change: quote.change,
    })
}
