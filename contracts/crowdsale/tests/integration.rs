//! Runs the sale and the token side by side in a multi-test chain.
//!
//! Amounts follow the default policy: the token has 4 decimals, the native coin 18,
//! and the exchange rate is $1000 per coin.

use accounting_token::msg::{
    BalanceResponse, ExecuteMsg as TokenExecuteMsg, InstantiateMsg as TokenInstantiateMsg,
    MinterResponse, QueryMsg as TokenQueryMsg,
};
use cosmwasm_std::{coins, Addr, Empty, Timestamp, Uint128};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};

use crowdsale::msg::{
    ExecuteMsg, InstantiateMsg, InvestedAmountResponse, QueryMsg, ScheduleResponse,
    StatusResponse, TotalsResponse,
};
use crowdsale::phase::Phase;
use crowdsale::ContractError;

const DENOM: &str = "wei";
const ETHER: u128 = 1_000_000_000_000_000_000;
const DAY: u64 = 24 * 60 * 60;
const WEEK: u64 = 7 * DAY;

fn token_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        accounting_token::contract::execute,
        accounting_token::contract::instantiate,
        accounting_token::contract::query,
    );
    Box::new(contract)
}

fn crowdsale_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        crowdsale::contract::execute,
        crowdsale::contract::instantiate,
        crowdsale::contract::query,
    );
    Box::new(contract)
}

/// Value in thousandths of a coin, so 39.8 coins is `milli_ether(39_800)`
fn milli_ether(amount: u128) -> u128 {
    amount * ETHER / 1_000
}

fn tokens(whole: u128) -> Uint128 {
    Uint128::new(whole * 10_000)
}

struct Suite {
    app: App,
    owner: Addr,
    wallet: Addr,
    investors: Vec<Addr>,
    token: Addr,
    sale: Addr,
    pre_sale_start: Timestamp,
}

impl Suite {
    fn new() -> Self {
        Self::with_sale_reserve(Uint128::zero())
    }

    /// `reserve` token units are minted to the sale before it takes over the token
    fn with_sale_reserve(reserve: Uint128) -> Self {
        let mut app = App::default();
        let owner = app.api().addr_make("owner");
        let wallet = app.api().addr_make("wallet");
        let oracle = app.api().addr_make("oracle");
        let investors: Vec<Addr> = (1..=4)
            .map(|i| app.api().addr_make(&format!("investor{i}")))
            .collect();

        app.init_modules(|router, _, storage| {
            for investor in &investors {
                router
                    .bank
                    .init_balance(storage, investor, coins(10_000 * ETHER, DENOM))
                    .unwrap();
            }
            router
                .bank
                .init_balance(storage, &wallet, coins(1_000 * ETHER, DENOM))
                .unwrap();
        });

        let token_code = app.store_code(token_contract());
        let sale_code = app.store_code(crowdsale_contract());

        let token = app
            .instantiate_contract(
                token_code,
                owner.clone(),
                &TokenInstantiateMsg {
                    name: "Omine.1 Token".to_string(),
                    symbol: "OM1".to_string(),
                    decimals: 4,
                    locked_holder: wallet.to_string(),
                    freezing_date: None,
                },
                &[],
                "token",
                None,
            )
            .unwrap();

        let pre_sale_start = app.block_info().time.plus_seconds(300);
        let sale = app
            .instantiate_contract(
                sale_code,
                owner.clone(),
                &InstantiateMsg {
                    token: token.to_string(),
                    beneficiary: wallet.to_string(),
                    denom: DENOM.to_string(),
                    exchange_rate: Uint128::new(100_000),
                    exchange_rate_provider: Some(oracle.to_string()),
                    pre_sale_start,
                    policy: None,
                },
                &[],
                "crowdsale",
                None,
            )
            .unwrap();

        if !reserve.is_zero() {
            app.execute_contract(
                owner.clone(),
                token.clone(),
                &TokenExecuteMsg::Mint {
                    recipient: sale.to_string(),
                    amount: reserve,
                },
                &[],
            )
            .unwrap();
        }
        app.execute_contract(
            owner.clone(),
            token.clone(),
            &TokenExecuteMsg::TransferOwnership {
                new_owner: sale.to_string(),
            },
            &[],
        )
        .unwrap();

        Suite {
            app,
            owner,
            wallet,
            investors,
            token,
            sale,
            pre_sale_start,
        }
    }

    fn investor(&self, index: usize) -> Addr {
        self.investors[index].clone()
    }

    fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += seconds / 5;
        });
    }

    fn buy(&mut self, buyer: &Addr, value: u128) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            buyer.clone(),
            self.sale.clone(),
            &ExecuteMsg::Buy {},
            &coins(value, DENOM),
        )
    }

    fn execute(&mut self, sender: &Addr, msg: ExecuteMsg) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), self.sale.clone(), &msg, &[])
    }

    fn load_refund(&mut self, value: u128) -> anyhow::Result<AppResponse> {
        let wallet = self.wallet.clone();
        self.app.execute_contract(
            wallet,
            self.sale.clone(),
            &ExecuteMsg::LoadRefund {},
            &coins(value, DENOM),
        )
    }

    fn totals(&self) -> TotalsResponse {
        self.app
            .wrap()
            .query_wasm_smart(&self.sale, &QueryMsg::Totals {})
            .unwrap()
    }

    fn phase(&self) -> Phase {
        let status: StatusResponse = self
            .app
            .wrap()
            .query_wasm_smart(&self.sale, &QueryMsg::Status {})
            .unwrap();
        status.phase
    }

    fn invested(&self, investor: &Addr) -> Uint128 {
        let res: InvestedAmountResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.sale,
                &QueryMsg::InvestedAmount {
                    address: investor.to_string(),
                },
            )
            .unwrap();
        res.amount
    }

    fn token_balance(&self, holder: &Addr) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.token,
                &TokenQueryMsg::Balance {
                    address: holder.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    fn native_balance(&self, holder: &Addr) -> u128 {
        self.app
            .wrap()
            .query_balance(holder, DENOM)
            .unwrap()
            .amount
            .u128()
    }
}

fn contract_error(err: anyhow::Error) -> ContractError {
    err.downcast::<ContractError>().unwrap()
}

#[test]
fn pre_sale_tiers_split_across_purchases() {
    let mut suite = Suite::new();
    suite.advance(600);
    let (a, b, c) = (suite.investor(1), suite.investor(2), suite.investor(3));
    let wallet = suite.wallet.clone();
    let wallet_before = suite.native_balance(&wallet);

    suite.buy(&a, milli_ether(680)).unwrap();
    assert_eq!(suite.token_balance(&a), tokens(1_000));

    // 34k at 0.68 and 1k at 0.80
    suite.buy(&b, milli_ether(23_920)).unwrap();
    assert_eq!(suite.token_balance(&b), tokens(35_000));

    // only 64k left under the pre-sale hard cap, 0.8 coins come back
    let before = suite.native_balance(&c);
    suite.buy(&c, 52 * ETHER).unwrap();
    assert_eq!(suite.token_balance(&c), tokens(64_000));
    assert_eq!(before - suite.native_balance(&c), milli_ether(51_200));

    let totals = suite.totals();
    assert_eq!(totals.investor_count, 3);
    assert_eq!(totals.funds_raised, Uint128::new(milli_ether(75_800)));
    assert_eq!(totals.tokens_sold, Uint128::new(1_000_000_000));
    // every purchase is forwarded to the beneficiary right away
    assert_eq!(
        suite.native_balance(&wallet) - wallet_before,
        milli_ether(75_800)
    );
    assert_eq!(suite.native_balance(&suite.sale.clone()), 0);
}

#[test]
fn oversized_pre_sale_purchase_returns_change() {
    let mut suite = Suite::new();
    suite.advance(600);
    let buyer = suite.investor(1);

    let before = suite.native_balance(&buyer);
    suite.buy(&buyer, 100 * ETHER).unwrap();
    assert_eq!(before - suite.native_balance(&buyer), milli_ether(75_800));
    assert_eq!(suite.totals().tokens_sold, tokens(100_000));

    let late = suite.investor(2);
    let err = suite.buy(&late, milli_ether(110)).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::CapExceeded {
            cap: tokens(100_000)
        }
    );
}

#[test]
fn purchases_rejected_before_start_and_while_halted() {
    let mut suite = Suite::new();
    let buyer = suite.investor(1);
    let owner = suite.owner.clone();

    let err = suite.buy(&buyer, milli_ether(110)).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::SaleNotStarted {
            starts_at: suite.pre_sale_start
        }
    );

    suite.advance(600);
    suite.execute(&owner, ExecuteMsg::Halt {}).unwrap();
    let err = suite.buy(&buyer, milli_ether(110)).unwrap_err();
    assert_eq!(contract_error(err), ContractError::Halted {});

    suite.execute(&owner, ExecuteMsg::Unhalt {}).unwrap();
    suite.buy(&buyer, milli_ether(110)).unwrap();

    let err = suite.buy(&buyer, ETHER / 10_000).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::BelowMinimumPurchase { min: tokens(1) }
    );
}

#[test]
fn pre_sale_start_reschedule() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let now = suite.app.block_info().time;

    let new_start = now.plus_seconds(900);
    suite
        .execute(&owner, ExecuteMsg::SetPreSaleStart { start: new_start })
        .unwrap();
    let schedule: ScheduleResponse = suite
        .app
        .wrap()
        .query_wasm_smart(&suite.sale, &QueryMsg::Schedule {})
        .unwrap();
    assert_eq!(schedule.pre_sale_start, new_start);
    assert_eq!(schedule.pre_sale_end, new_start.plus_seconds(14 * DAY));
    assert_eq!(schedule.ico_start, new_start.plus_seconds(14 * DAY));
    assert_eq!(schedule.ico_end, new_start.plus_seconds(42 * DAY));

    let stranger = suite.investor(1);
    let err = suite
        .execute(&stranger, ExecuteMsg::SetPreSaleStart { start: new_start })
        .unwrap_err();
    assert_eq!(contract_error(err), ContractError::Unauthorized {});

    suite.advance(1_000);
    let later = suite.app.block_info().time.plus_seconds(300);
    let err = suite
        .execute(&owner, ExecuteMsg::SetPreSaleStart { start: later })
        .unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::PreSaleAlreadyStarted {
            started_at: new_start
        }
    );
}

#[test]
fn ico_start_reschedule() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    suite.advance(600);
    let now = suite.app.block_info().time;

    let err = suite
        .execute(
            &owner,
            ExecuteMsg::SetIcoStart {
                start: now.plus_seconds(999),
            },
        )
        .unwrap_err();
    assert!(matches!(
        contract_error(err),
        ContractError::MainSaleBeforePreSaleEnd { .. }
    ));

    let ico_start = now.plus_seconds(28 * DAY);
    suite
        .execute(&owner, ExecuteMsg::SetIcoStart { start: ico_start })
        .unwrap();
    let schedule: ScheduleResponse = suite
        .app
        .wrap()
        .query_wasm_smart(&suite.sale, &QueryMsg::Schedule {})
        .unwrap();
    assert_eq!(schedule.ico_start, ico_start);
    assert_eq!(schedule.ico_end, ico_start.plus_seconds(28 * DAY));
}

#[test]
fn ico_start_locked_once_main_sale_runs() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let buyer = suite.investor(2);
    suite.advance(600);
    suite.buy(&buyer, 50 * ETHER).unwrap();

    suite.advance(14 * DAY);
    assert_eq!(suite.phase(), Phase::MainSale);
    let start = suite.app.block_info().time.plus_seconds(300);
    let err = suite
        .execute(&owner, ExecuteMsg::SetIcoStart { start })
        .unwrap_err();
    assert!(matches!(
        contract_error(err),
        ContractError::MainSaleAlreadyStarted { .. }
    ));
}

#[test]
fn gap_between_sales_blocks_purchases_and_refunds() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let buyer = suite.investor(2);
    suite.advance(600);
    let ico_start = suite.pre_sale_start.plus_seconds(4 * WEEK);
    suite
        .execute(&owner, ExecuteMsg::SetIcoStart { start: ico_start })
        .unwrap();

    // 42_750 tokens, above the pre-sale soft cap
    suite.buy(&buyer, 30 * ETHER).unwrap();
    assert_eq!(suite.totals().tokens_sold, tokens(42_750));

    suite.advance(2 * WEEK);
    assert_eq!(suite.phase(), Phase::AwaitingMainSale);
    let err = suite.buy(&buyer, milli_ether(100)).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::MainSaleNotStarted {
            starts_at: ico_start
        }
    );
    let err = suite.execute(&buyer, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});
}

#[test]
fn refund_after_failed_pre_sale() {
    let mut suite = Suite::new();
    let buyer = suite.investor(2);
    suite.advance(600);

    let err = suite.execute(&buyer, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});

    // 29_411_764 units at 0.68, the remainder below one unit comes back
    let before = suite.native_balance(&buyer);
    let res = suite.buy(&buyer, 2 * ETHER).unwrap();
    let invested = suite.invested(&buyer);
    assert_eq!(invested, Uint128::new(1_999_999_952_000_000_000));
    assert_eq!(before - suite.native_balance(&buyer), invested.u128());
    let change = res
        .events
        .iter()
        .find(|event| event.ty == "wasm-purchase")
        .and_then(|event| event.attributes.iter().find(|attr| attr.key == "change"))
        .map(|attr| attr.value.clone())
        .unwrap();
    assert_eq!(change, "48000000000");
    assert_eq!(suite.token_balance(&buyer), Uint128::new(29_411_764));

    suite.advance(2 * WEEK);
    assert_eq!(suite.phase(), Phase::Refunding);

    let err = suite.execute(&buyer, ExecuteMsg::Refund {}).unwrap_err();
    assert!(matches!(
        contract_error(err),
        ContractError::EscrowUnderfunded { .. }
    ));

    suite.load_refund(invested.u128()).unwrap();
    let before = suite.native_balance(&buyer);
    suite.execute(&buyer, ExecuteMsg::Refund {}).unwrap();
    assert_eq!(suite.native_balance(&buyer) - before, invested.u128());

    let totals = suite.totals();
    assert_eq!(totals.funds_refunded, invested);
    assert_eq!(totals.refund_escrow, Uint128::zero());
    assert_eq!(suite.invested(&buyer), Uint128::zero());
    assert_eq!(suite.native_balance(&suite.sale.clone()), 0);

    let err = suite.execute(&buyer, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::NothingToRefund {});
}

#[test]
fn main_sale_stops_at_hard_cap() {
    let mut suite = Suite::new();
    let (a, b, d) = (suite.investor(1), suite.investor(2), suite.investor(3));
    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();

    suite.advance(4 * WEEK);
    suite.buy(&a, 2_500 * ETHER).unwrap();
    suite.buy(&b, 1_400 * ETHER).unwrap();
    assert_eq!(suite.totals().tokens_sold, tokens(4_000_000));

    let err = suite.buy(&d, 100 * ETHER).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::CapExceeded {
            cap: tokens(4_000_000)
        }
    );
}

#[test]
fn no_purchases_after_main_sale_end() {
    let mut suite = Suite::new();
    let (a, b, d) = (suite.investor(1), suite.investor(2), suite.investor(3));
    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 1_400 * ETHER).unwrap();

    suite.advance(2 * WEEK);
    assert_eq!(suite.phase(), Phase::Succeeded);
    let err = suite.buy(&d, 100 * ETHER).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleClosed {});
}

#[test]
fn weekly_price_ladder_until_hard_cap() {
    let mut suite = Suite::new();
    let (a, b, c) = (suite.investor(1), suite.investor(2), suite.investor(3));
    suite.advance(600);

    suite.buy(&a, milli_ether(39_800)).unwrap();
    assert_eq!(suite.token_balance(&a), tokens(55_000));

    suite.advance(2 * WEEK);
    // first week at 0.90
    suite.buy(&b, 900 * ETHER).unwrap();
    assert_eq!(suite.token_balance(&b), tokens(1_000_000));

    suite.advance(WEEK);
    // 1.00
    suite.buy(&a, 2_000 * ETHER).unwrap();
    assert_eq!(suite.token_balance(&a), tokens(2_055_000));

    suite.advance(2 * WEEK);
    // last week at 1.10, clamped at the hard cap
    let before = suite.native_balance(&c);
    suite.buy(&c, 1_100 * ETHER).unwrap();
    assert_eq!(suite.token_balance(&c), tokens(945_000));
    assert_eq!(before - suite.native_balance(&c), milli_ether(1_039_500));

    let totals = suite.totals();
    assert_eq!(totals.investor_count, 3);
    assert_eq!(totals.tokens_sold, tokens(4_000_000));
    assert_eq!(totals.funds_raised, Uint128::new(milli_ether(3_979_300)));
}

#[test]
fn finalize_rejected_below_soft_cap() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let (a, b) = (suite.investor(1), suite.investor(2));

    let err = suite.execute(&a, ExecuteMsg::Finalize {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::Unauthorized {});

    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 850 * ETHER).unwrap();
    suite.advance(2 * WEEK);
    assert_eq!(suite.totals().tokens_sold, tokens(950_000));

    let err = suite.execute(&owner, ExecuteMsg::Finalize {}).unwrap_err();
    assert_eq!(
        contract_error(err),
        ContractError::SoftCapNotReached {
            soft_cap: tokens(1_000_000),
            tokens_sold: tokens(950_000)
        }
    );
}

#[test]
fn finalize_pays_out_and_returns_token() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let wallet = suite.wallet.clone();
    let sale = suite.sale.clone();
    let (a, b) = (suite.investor(1), suite.investor(2));
    let wallet_before = suite.native_balance(&wallet);

    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 900 * ETHER).unwrap();

    // soft cap reached, but no refunds for anyone
    let err = suite.execute(&a, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});
    suite.advance(2 * WEEK);
    let err = suite.execute(&a, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleSucceeded {});

    suite.execute(&owner, ExecuteMsg::Finalize {}).unwrap();

    let raised = suite.totals().funds_raised.u128();
    assert_eq!(suite.native_balance(&wallet) - wallet_before, raised);
    assert_eq!(suite.native_balance(&sale), 0);
    assert_eq!(suite.token_balance(&sale), Uint128::zero());
    assert_eq!(suite.token_balance(&wallet), tokens(100_000));
    assert_eq!(suite.phase(), Phase::Finalized);

    let err = suite.execute(&owner, ExecuteMsg::Finalize {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::AlreadyFinalized {});

    // the owner controls the token again, minting is closed for good
    let minter: MinterResponse = suite
        .app
        .wrap()
        .query_wasm_smart(&suite.token, &TokenQueryMsg::Minter {})
        .unwrap();
    assert_eq!(minter.minter, owner);
    assert!(minter.minting_finished);
    suite
        .app
        .execute_contract(
            owner,
            suite.token.clone(),
            &TokenExecuteMsg::ReleaseTokenTransfer {},
            &[],
        )
        .unwrap();
}

#[test]
fn finalize_sweeps_tokens_held_by_sale() {
    let mut suite = Suite::with_sale_reserve(tokens(500_000));
    let owner = suite.owner.clone();
    let wallet = suite.wallet.clone();
    let sale = suite.sale.clone();
    let (a, b) = (suite.investor(1), suite.investor(2));

    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 900 * ETHER).unwrap();
    suite.advance(2 * WEEK);
    suite.execute(&owner, ExecuteMsg::Finalize {}).unwrap();

    assert_eq!(suite.token_balance(&sale), Uint128::zero());
    assert_eq!(suite.token_balance(&wallet), tokens(600_000));
}

#[test]
fn refund_after_failed_main_sale() {
    let mut suite = Suite::new();
    let (a, b) = (suite.investor(1), suite.investor(2));
    suite.advance(600);
    suite.buy(&b, milli_ether(39_800)).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 850 * ETHER).unwrap();

    let err = suite.execute(&b, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});

    suite.advance(2 * WEEK);
    assert_eq!(suite.phase(), Phase::Refunding);
    let stranger = suite.investor(3);
    let err = suite
        .app
        .execute_contract(
            stranger,
            suite.sale.clone(),
            &ExecuteMsg::LoadRefund {},
            &coins(ETHER, DENOM),
        )
        .unwrap_err();
    assert_eq!(contract_error(err), ContractError::Unauthorized {});
    suite.load_refund(milli_ether(889_800)).unwrap();

    let before = suite.native_balance(&b);
    suite.execute(&b, ExecuteMsg::Refund {}).unwrap();
    assert_eq!(suite.native_balance(&b) - before, milli_ether(39_800));
    assert_eq!(
        suite.totals().funds_refunded,
        Uint128::new(milli_ether(39_800))
    );
    assert_eq!(suite.invested(&b), Uint128::zero());

    let err = suite.execute(&b, ExecuteMsg::Refund {}).unwrap_err();
    assert_eq!(contract_error(err), ContractError::NothingToRefund {});

    suite.execute(&a, ExecuteMsg::Refund {}).unwrap();
    let totals = suite.totals();
    assert_eq!(totals.refund_escrow, Uint128::zero());
    assert_eq!(totals.funds_refunded, totals.funds_raised);
    // nothing stays behind once every investor is refunded
    assert_eq!(suite.native_balance(&suite.sale.clone()), 0);
}

#[test]
fn refund_escrow_only_loaded_after_failure() {
    let mut suite = Suite::new();
    let (a, b) = (suite.investor(1), suite.investor(2));
    suite.advance(600);

    let err = suite.load_refund(ETHER).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});

    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 900 * ETHER).unwrap();
    let err = suite.load_refund(ETHER).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleNotClosed {});

    suite.advance(2 * WEEK);
    assert_eq!(suite.phase(), Phase::Succeeded);
    let err = suite.load_refund(ETHER).unwrap_err();
    assert_eq!(contract_error(err), ContractError::SaleSucceeded {});
    assert_eq!(suite.totals().refund_escrow, Uint128::zero());
}

#[test]
fn finalize_during_main_sale_once_soft_cap_reached() {
    let mut suite = Suite::new();
    let owner = suite.owner.clone();
    let wallet = suite.wallet.clone();
    let (a, b, c) = (suite.investor(1), suite.investor(2), suite.investor(3));
    suite.advance(600);
    suite.buy(&b, 100 * ETHER).unwrap();
    suite.advance(4 * WEEK);
    suite.buy(&a, 900 * ETHER).unwrap();
    assert_eq!(suite.phase(), Phase::MainSale);

    suite.execute(&owner, ExecuteMsg::Finalize {}).unwrap();
    assert_eq!(suite.phase(), Phase::Finalized);
    assert_eq!(suite.token_balance(&wallet), tokens(100_000));

    let err = suite.buy(&c, 10 * ETHER).unwrap_err();
    assert_eq!(contract_error(err), ContractError::AlreadyFinalized {});
}
