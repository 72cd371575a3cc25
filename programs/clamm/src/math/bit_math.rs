//! Bit Math
//!
//! Most/least significant bit of a 256-bit bitmap word, by binary search
//! over halving widths.

use crate::errors::ClammError;
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Find the most significant bit (position of highest set bit)
///
/// Fails with `ZeroValue` for an input of 0, which has no set bit.
pub fn most_significant_bit(x: U256) -> Result<u8> {
    require!(!x.is_zero(), ClammError::ZeroValue);

    let mut n = x;
    let mut r = 0u8;

    for shift in [128u32, 64, 32, 16, 8, 4, 2, 1] {
        if n >= U256::one() << shift {
            n >>= shift;
            r += shift as u8;
        }
    }

    Ok(r)
}

/// Find the least significant bit (position of lowest set bit)
///
/// Fails with `ZeroValue` for an input of 0.
pub fn least_significant_bit(x: U256) -> Result<u8> {
    require!(!x.is_zero(), ClammError::ZeroValue);

    let mut n = x;
    let mut r = 255u8;

    for shift in [128u32, 64, 32, 16, 8, 4, 2] {
        let mask = (U256::one() << shift) - U256::one();
        if !(n & mask).is_zero() {
            r -= shift as u8;
        } else {
            n >>= shift;
        }
    }
    if !(n & U256::one()).is_zero() {
        r -= 1;
    }

    Ok(r)
}
