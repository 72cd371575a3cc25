//! Sqrt Price Math
//!
//! Functions for computing the next sqrt price given token deltas.

use crate::errors::ClammError;
use crate::math::full_math::{div_rounding_up, mul_div_rounding_up};
use crate::math::liquidity_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Get the next sqrt price after a token 0 delta, rounding up
/// When adding token 0 (price goes down):
///   new_sqrt_price = L * sqrt_price / (L + amount * sqrt_price)
///
/// When removing token 0 (price goes up):
///   new_sqrt_price = L * sqrt_price / (L - amount * sqrt_price)
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<U256> {
    if amount == 0 {
        return Ok(sqrt_price_x96);
    }

    let numerator_1 = U256::from(liquidity) << 96u32;
    let product = U256::from(amount).checked_mul(sqrt_price_x96);

    let next = if add {
        match product.and_then(|product| numerator_1.checked_add(product)) {
            Some(denominator) => mul_div_rounding_up(numerator_1, sqrt_price_x96, denominator)?,
            // L / (L / sqrt_price + amount), less precise but never overflows
            None => {
                let denominator = (numerator_1 / sqrt_price_x96)
                    .checked_add(U256::from(amount))
                    .ok_or(ClammError::MathOverflow)?;
                div_rounding_up(numerator_1, denominator)?
            }
        }
    } else {
        let product = product.ok_or(ClammError::InsufficientLiquidity)?;
        require!(numerator_1 > product, ClammError::InsufficientLiquidity);
        mul_div_rounding_up(numerator_1, sqrt_price_x96, numerator_1 - product)?
    };

    require!(next.fits_u160(), ClammError::SqrtPriceOutOfRange);
    Ok(next)
}

/// Get the next sqrt price after a token 1 delta, rounding down
/// When adding token 1 (price goes up):
///   new_sqrt_price = sqrt_price + amount / L
///
/// When removing token 1 (price goes down):
///   new_sqrt_price = sqrt_price - amount / L
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> Result<U256> {
    require!(liquidity > 0, ClammError::ZeroLiquidity);
    let scaled_amount = U256::from(amount) << 96u32;

    if add {
        let quotient = scaled_amount / U256::from(liquidity);
        let next = sqrt_price_x96
            .checked_add(quotient)
            .ok_or(ClammError::SqrtPriceOutOfRange)?;
        require!(next.fits_u160(), ClammError::SqrtPriceOutOfRange);
        Ok(next)
    } else {
        let quotient = div_rounding_up(scaled_amount, U256::from(liquidity))?;
        require!(sqrt_price_x96 > quotient, ClammError::InsufficientLiquidity);
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Get the next sqrt price from input amount
/// Rounds so the price never passes the target implied by the exact input
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> Result<U256> {
    require!(!sqrt_price_x96.is_zero(), ClammError::ZeroSqrtPrice);
    require!(liquidity > 0, ClammError::ZeroLiquidity);

    if zero_for_one {
        // Adding token 0, sqrt price decreases
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        // Adding token 1, sqrt price increases
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Get the next sqrt price from output amount
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> Result<U256> {
    require!(!sqrt_price_x96.is_zero(), ClammError::ZeroSqrtPrice);
    require!(liquidity > 0, ClammError::ZeroLiquidity);

    if zero_for_one {
        // Removing token 1, sqrt price decreases
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x96, liquidity, amount_out, false)
    } else {
        // Removing token 0, sqrt price increases
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x96, liquidity, amount_out, false)
    }
}

fn signed(amount: U256, negative: bool) -> Result<i128> {
    let amount = i128::try_from(amount.try_into_u128()?).map_err(|_| ClammError::CastOverflow)?;
    if negative {
        Ok(-amount)
    } else {
        Ok(amount)
    }
}

/// Signed token 0 delta for a signed liquidity change
/// Added liquidity rounds the owed amount up, removed liquidity rounds the paid-out amount down
pub fn get_amount_0_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<i128> {
    let negative = liquidity < 0;
    let amount = get_amount_0_delta(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        !negative,
    )?;
    signed(amount, negative)
}

/// Signed token 1 delta for a signed liquidity change
pub fn get_amount_1_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<i128> {
    let negative = liquidity < 0;
    let amount = get_amount_1_delta(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        !negative,
    )?;
    signed(amount, negative)
}
