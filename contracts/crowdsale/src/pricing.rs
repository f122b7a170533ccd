use cosmwasm_std::{Uint128, Uint256};

use crate::error::ContractError;
use crate::policy::SalePolicy;

/// Sell tokens at `price` until the cumulative amount sold reaches `until`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub until: Uint128,
    pub price: Uint128,
}

/// The part of a purchase filled within one segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
    pub price: Uint128,
    pub tokens: Uint128,
    pub cost: Uint128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Quote {
    pub tokens: Uint128,
    pub cost: Uint128,
    /// Part of the sent value that is not consumed and goes back to the buyer
    pub change: Uint128,
    pub fills: Vec<Fill>,
}

/// Converts between native value and token units for a given exchange rate.
///
/// The rate is quote minor units per whole native coin, prices are quote minor
/// units per whole token. Token amounts round down, costs round up, so the cost
/// of the tokens bought with some value never exceeds that value.
#[derive(Clone, Copy, Debug)]
pub struct Converter {
    rate: Uint128,
    token_unit: Uint128,
    native_unit: Uint128,
}

impl Converter {
    pub fn new(rate: Uint128, policy: &SalePolicy) -> Self {
        Converter {
            rate,
            token_unit: policy.token_unit(),
            native_unit: policy.native_unit(),
        }
    }

    pub fn tokens_for(&self, value: Uint128, price: Uint128) -> Result<Uint128, ContractError> {
        let numerator = Uint256::from(value)
            .checked_mul(Uint256::from(self.rate))?
            .checked_mul(Uint256::from(self.token_unit))?;
        let denominator = Uint256::from(price).checked_mul(Uint256::from(self.native_unit))?;
        Ok(Uint128::try_from(numerator.checked_div(denominator)?)?)
    }

    pub fn cost_of(&self, tokens: Uint128, price: Uint128) -> Result<Uint128, ContractError> {
        let numerator = Uint256::from(tokens)
            .checked_mul(Uint256::from(price))?
            .checked_mul(Uint256::from(self.native_unit))?;
        let denominator = Uint256::from(self.rate).checked_mul(Uint256::from(self.token_unit))?;
        let cost = numerator
            .checked_add(denominator.checked_sub(Uint256::one())?)?
            .checked_div(denominator)?;
        Ok(Uint128::try_from(cost)?)
    }
}

/// Price of the segment the next token unit would be sold from.
pub fn current_price(segments: &[Segment], tokens_sold: Uint128) -> Option<Uint128> {
    segments
        .iter()
        .find(|segment| tokens_sold < segment.until)
        .map(|segment| segment.price)
}

/// Fills a purchase of `value` across `segments` starting at `tokens_sold`.
///
/// Each segment absorbs as much of the remaining value as it has room for, the
/// rest carries over to the next one. Whatever no segment can absorb is change.
pub fn fill(
    converter: &Converter,
    segments: &[Segment],
    tokens_sold: Uint128,
    value: Uint128,
) -> Result<Quote, ContractError> {
    let mut quote = Quote::default();
    let mut sold = tokens_sold;
    let mut remaining = value;

    for segment in segments {
        if sold >= segment.until {
            continue;
        }
        let room = segment.until.checked_sub(sold)?;
        let affordable = converter.tokens_for(remaining, segment.price)?;
        let tokens = room.min(affordable);
        if tokens.is_zero() {
            break;
        }
        let cost = converter.cost_of(tokens, segment.price)?;

        remaining = remaining.checked_sub(cost)?;
        sold = sold.checked_add(tokens)?;
        quote.tokens = quote.tokens.checked_add(tokens)?;
        quote.cost = quote.cost.checked_add(cost)?;
        quote.fills.push(Fill {
            price: segment.price,
            tokens,
            cost,
        });

        if tokens < room {
            break;
        }
    }

    quote.change = remaining;
    Ok(quote)
}

/// Prices a purchase of `value`, enforcing the cap and the minimum purchase.
pub fn price_purchase(
    converter: &Converter,
    segments: &[Segment],
    tokens_sold: Uint128,
    value: Uint128,
    min_tokens: Uint128,
) -> Result<Quote, ContractError> {
    let cap = segments
        .last()
        .map(|segment| segment.until)
        .unwrap_or_default();
    let price = current_price(segments, tokens_sold).ok_or(ContractError::CapExceeded { cap })?;
    if converter.tokens_for(value, price)? < min_tokens {
        return Err(ContractError::BelowMinimumPurchase { min: min_tokens });
    }

    let quote = fill(converter, segments, tokens_sold, value)?;
    if quote.tokens.is_zero() {
        return Err(ContractError::CapExceeded { cap });
    }
    Ok(quote)
}
