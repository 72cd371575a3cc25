//! Swap Math
//!
//! Core swap computation logic.

use crate::constants::FEE_RATE_DENOMINATOR;
use crate::errors::ClammError;
use crate::math::full_math::{mul_div, mul_div_rounding_up, Q128};
use crate::math::liquidity_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::sqrt_price_math::{
    get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Result of a single swap step computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStepResult {
    /// The new sqrt price after the swap step
    pub sqrt_price_next_x96: U256,
    /// Amount of input token consumed, excluding fee
    pub amount_in: U256,
    /// Amount of output token produced
    pub amount_out: U256,
    /// Fee amount collected, in the input token
    pub fee_amount: U256,
}

/// Compute the result of a single swap step
///
/// # Arguments
/// * `sqrt_price_current_x96` - Current sqrt price (Q64.96)
/// * `sqrt_price_target_x96` - Target sqrt price; also encodes direction (zero for one iff current >= target)
/// * `liquidity` - Available liquidity
/// * `amount_remaining` - Positive for exact input remaining, negative for exact output remaining
/// * `fee_rate` - Fee rate in hundredths of a bip (3000 = 0.3%)
///
/// # Returns
/// SwapStepResult with next price, amounts in/out, and fees
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: i128,
    fee_rate: u32,
) -> Result<SwapStepResult> {
    require!(fee_rate < FEE_RATE_DENOMINATOR, ClammError::FeeRateTooHigh);

    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let exact_input = amount_remaining >= 0;
    let amount_remaining_abs = amount_remaining.unsigned_abs();
    let fee_complement = U256::from(FEE_RATE_DENOMINATOR - fee_rate);

    let sqrt_price_next_x96;
    let mut amount_in = U256::zero();
    let mut amount_out = U256::zero();

    if exact_input {
        let amount_remaining_less_fee = mul_div(
            U256::from(amount_remaining_abs),
            fee_complement,
            U256::from(FEE_RATE_DENOMINATOR),
        )?;

        amount_in = if zero_for_one {
            get_amount_0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)?
        };

        sqrt_price_next_x96 = if amount_remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            // Fits in u128: bounded by amount_remaining_abs
            get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_less_fee.low_u128(),
                zero_for_one,
            )?
        };
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)?
        };

        sqrt_price_next_x96 = if U256::from(amount_remaining_abs) >= amount_out {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_abs,
                zero_for_one,
            )?
        };
    }

    let reached_target = sqrt_price_target_x96 == sqrt_price_next_x96;

    // Recompute against the final price unless the target amount is already exact
    if zero_for_one {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount_0_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount_1_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount_1_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount_0_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, false)?;
        }
    }

    // Cap the output at the requested amount
    if !exact_input && amount_out > U256::from(amount_remaining_abs) {
        amount_out = U256::from(amount_remaining_abs);
    }

    let fee_amount = if exact_input && !reached_target {
        // Whatever input is left over is taken as fee
        U256::from(amount_remaining_abs)
            .checked_sub(amount_in)
            .ok_or(ClammError::MathUnderflow)?
    } else {
        mul_div_rounding_up(amount_in, U256::from(fee_rate), fee_complement)?
    };

    Ok(SwapStepResult {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}

/// Split the protocol share off a step's fee
/// `fee_protocol` is the denominator of the share (0 disables it)
pub fn calculate_protocol_fee(fee_amount: U256, fee_protocol: u8) -> U256 {
    if fee_protocol == 0 {
        return U256::zero();
    }
    fee_amount / U256::from(fee_protocol)
}

/// Calculate fee growth per unit of liquidity
/// fee_growth = fee_amount * 2^128 / liquidity
pub fn calculate_fee_growth(fee_amount: U256, liquidity: u128) -> Result<U256> {
    if liquidity == 0 || fee_amount.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(fee_amount, Q128, U256::from(liquidity))
}
