//! Liquidity Math
//!
//! Functions for computing liquidity deltas and token amounts.

use crate::errors::ClammError;
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up, Q96};
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Add a signed liquidity delta to existing liquidity
/// Fails instead of wrapping in either direction
pub fn add_liquidity_delta(x: u128, y: i128) -> Result<u128> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(ClammError::LiquidityUnderflow.into())
    } else {
        x.checked_add(y as u128)
            .ok_or(ClammError::LiquidityOverflow.into())
    }
}

/// Order two sqrt prices so that the first is the lower one
fn sorted(sqrt_ratio_a_x96: U256, sqrt_ratio_b_x96: U256) -> (U256, U256) {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    }
}

/// Calculate the amount of token 0 between two prices for a given liquidity
///
/// amount0 = liquidity * 2^96 * (sqrt_b - sqrt_a) / (sqrt_b * sqrt_a)
///
/// `round_up` is set when the amount is owed *to* the pool, so the payer
/// can never underpay; receivable amounts round down.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    require!(!sqrt_ratio_lower.is_zero(), ClammError::ZeroSqrtPrice);

    let numerator_1 = U256::from(liquidity) << 96u32;
    let numerator_2 = sqrt_ratio_upper - sqrt_ratio_lower;

    // Divide by sqrt_upper first, then sqrt_lower; their product may exceed 256 bits
    if round_up {
        div_rounding_up(
            mul_div_rounding_up(numerator_1, numerator_2, sqrt_ratio_upper)?,
            sqrt_ratio_lower,
        )
    } else {
        Ok(mul_div(numerator_1, numerator_2, sqrt_ratio_upper)? / sqrt_ratio_lower)
    }
}

/// Calculate the amount of token 1 between two prices for a given liquidity
///
/// amount1 = liquidity * (sqrt_b - sqrt_a) / 2^96
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let diff = sqrt_ratio_upper - sqrt_ratio_lower;

    if round_up {
        mul_div_rounding_up(U256::from(liquidity), diff, Q96)
    } else {
        mul_div(U256::from(liquidity), diff, Q96)
    }
}

/// Calculate the liquidity received for a given amount of token 0
/// Inverse of get_amount_0_delta (rounding down)
pub fn get_liquidity_for_amount_0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount_0: u128,
) -> Result<u128> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    require!(sqrt_ratio_lower != sqrt_ratio_upper, ClammError::InvalidTickRange);

    let intermediate = mul_div(sqrt_ratio_lower, sqrt_ratio_upper, Q96)?;
    mul_div(
        U256::from(amount_0),
        intermediate,
        sqrt_ratio_upper - sqrt_ratio_lower,
    )?
    .try_into_u128()
}

/// Calculate the liquidity received for a given amount of token 1
/// Inverse of get_amount_1_delta (rounding down)
pub fn get_liquidity_for_amount_1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount_1: u128,
) -> Result<u128> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    require!(sqrt_ratio_lower != sqrt_ratio_upper, ClammError::InvalidTickRange);

    mul_div(U256::from(amount_1), Q96, sqrt_ratio_upper - sqrt_ratio_lower)?.try_into_u128()
}

/// Calculate the maximum liquidity that the given amounts can back
/// for a position in the range [sqrt_ratio_lower, sqrt_ratio_upper] at the current price
pub fn get_liquidity_for_amounts(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount_0: u128,
    amount_1: u128,
) -> Result<u128> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_current_x96 <= sqrt_ratio_lower {
        // Current price is below range, only token 0 is needed
        get_liquidity_for_amount_0(sqrt_ratio_lower, sqrt_ratio_upper, amount_0)
    } else if sqrt_ratio_current_x96 < sqrt_ratio_upper {
        // Current price is in range, the scarcer token decides
        let liquidity_0 =
            get_liquidity_for_amount_0(sqrt_ratio_current_x96, sqrt_ratio_upper, amount_0)?;
        let liquidity_1 =
            get_liquidity_for_amount_1(sqrt_ratio_lower, sqrt_ratio_current_x96, amount_1)?;
        Ok(liquidity_0.min(liquidity_1))
    } else {
        // Current price is above range, only token 1 is needed
        get_liquidity_for_amount_1(sqrt_ratio_lower, sqrt_ratio_upper, amount_1)
    }
}

/// Calculate the token amounts backing a liquidity amount at the current price
pub fn get_amounts_for_liquidity(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<(U256, U256)> {
    let (sqrt_ratio_lower, sqrt_ratio_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_current_x96 <= sqrt_ratio_lower {
        let amount_0 =
            get_amount_0_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?;
        Ok((amount_0, U256::zero()))
    } else if sqrt_ratio_current_x96 < sqrt_ratio_upper {
        let amount_0 =
            get_amount_0_delta(sqrt_ratio_current_x96, sqrt_ratio_upper, liquidity, round_up)?;
        let amount_1 =
            get_amount_1_delta(sqrt_ratio_lower, sqrt_ratio_current_x96, liquidity, round_up)?;
        Ok((amount_0, amount_1))
    } else {
        let amount_1 =
            get_amount_1_delta(sqrt_ratio_lower, sqrt_ratio_upper, liquidity, round_up)?;
        Ok((U256::zero(), amount_1))
    }
}
