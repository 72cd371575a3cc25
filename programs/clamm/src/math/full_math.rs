//! Full precision math operations
//!
//! `a * b / denominator` is computed over an exact 512-bit product, so no
//! precision is lost when `a * b` exceeds 256 bits. Only the quotient has
//! to fit.

use crate::errors::ClammError;
use crate::math::u256::{U256, U512};
use anchor_lang::prelude::*;

/// Q96 constant (2^96), the scale of a sqrt price
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);

/// Q128 constant (2^128), the scale of fee growth and seconds-per-liquidity
pub const Q128: U256 = U256([0, 0, 1, 0]);

/// Multiply two 256-bit numbers and divide by a third, with full precision
///
/// # Formula
/// result = floor(a * b / denominator)
///
/// # Errors
/// * `DivisionByZero` - denominator is zero
/// * `MulDivOverflow` - the quotient does not fit in 256 bits
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    let (quotient, _) = mul_div_rem(a, b, denominator)?;
    Ok(quotient)
}

/// Multiply two 256-bit numbers and divide by a third, rounding up
///
/// Floors first, then adds one if `(a * b) mod denominator != 0`.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256> {
    let (quotient, remainder_is_zero) = mul_div_rem(a, b, denominator)?;
    if remainder_is_zero {
        return Ok(quotient);
    }
    quotient
        .checked_add(U256::one())
        .ok_or(ClammError::MulDivOverflow.into())
}

/// `ceil(x / y)`, failing on a zero divisor
pub fn div_rounding_up(x: U256, y: U256) -> Result<U256> {
    if y.is_zero() {
        return Err(ClammError::DivisionByZero.into());
    }
    let quotient = x / y;
    if (x % y).is_zero() {
        Ok(quotient)
    } else {
        // x / y < U256::MAX whenever the remainder is non-zero and y > 1
        Ok(quotient + U256::one())
    }
}

/// Shared 512-bit core: floored quotient plus whether the division was exact
fn mul_div_rem(a: U256, b: U256, denominator: U256) -> Result<(U256, bool)> {
    if denominator.is_zero() {
        return Err(ClammError::DivisionByZero.into());
    }

    let product: U512 = a.widen() * b.widen();
    let divisor = denominator.widen();

    let quotient = U256::narrow(product / divisor).ok_or(ClammError::MulDivOverflow)?;
    Ok((quotient, (product % divisor).is_zero()))
}
