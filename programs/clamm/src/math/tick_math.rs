//! Tick Math
//!
//! Converts between tick indices and Q64.96 sqrt prices.
//!
//! tick = log_{1.0001}(price)
//! sqrt_price = sqrt(1.0001^tick) * 2^96

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::errors::ClammError;
use crate::math::bit_math::most_significant_bit;
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// 2^128 / sqrt(1.0001)^(2^i) for i in 1..20, as Q128.128 multipliers
const RATIO_MULTIPLIERS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

/// 2^128 / sqrt(1.0001)
const RATIO_BIT_0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// log_sqrt(1.0001)(2) as Q128.128
const LOG_SQRT_10001: u128 = 255738958999603826347141;

/// Error bounds of the log approximation, Q128.128
const TICK_LOW_ERROR: u128 = 3402992956809132418596140100660247210;
const TICK_HIGH_ERROR: u128 = 291339464771989622907027621153398088495;

/// Calculate sqrt(1.0001^tick) * 2^96
///
/// # Errors
/// * `TickOutOfRange` - |tick| > MAX_TICK
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256> {
    let abs_tick = tick.unsigned_abs();
    require!(abs_tick <= MAX_TICK as u32, ClammError::TickOutOfRange);

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(RATIO_BIT_0)
    } else {
        U256::one() << 128u32
    };

    for (i, multiplier) in RATIO_MULTIPLIERS.iter().enumerate() {
        if abs_tick & (1u32 << (i + 1)) != 0 {
            ratio = (ratio * U256::from(*multiplier)) >> 128u32;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so that get_tick_at_sqrt_ratio inverts exactly
    let round_up = if ratio.low_u64() as u32 == 0 { 0u8 } else { 1u8 };
    Ok((ratio >> 32u32) + U256::from(round_up))
}

/// Calculate the greatest tick whose sqrt ratio is <= `sqrt_price_x96`
///
/// # Errors
/// * `SqrtPriceOutOfRange` - price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32> {
    require!(
        sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO,
        ClammError::SqrtPriceOutOfRange
    );

    let ratio = sqrt_price_x96 << 32u32;
    let msb = most_significant_bit(ratio)? as u32;

    // Normalize so that bit 127 is the leading bit
    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: i128 = (msb as i128 - 128) << 64;

    for shift in (50..64).rev() {
        r = (r * r) >> 127u32;
        let f = r >> 128u32;
        log_2 |= (f.low_u64() as i128) << shift;
        r >>= f.low_u64() as u32;
    }

    // The product needs 256 bits of two's-complement arithmetic
    let log_2 = if log_2 >= 0 {
        U256::from(log_2 as u128)
    } else {
        U256::zero().overflowing_sub(U256::from(log_2.unsigned_abs())).0
    };
    let log_sqrt_10001 = log_2.overflowing_mul(U256::from(LOG_SQRT_10001)).0;

    let tick_low = high_half_as_tick(log_sqrt_10001.overflowing_sub(U256::from(TICK_LOW_ERROR)).0);
    let tick_high = high_half_as_tick(log_sqrt_10001.overflowing_add(U256::from(TICK_HIGH_ERROR)).0);

    if tick_low == tick_high {
        Ok(tick_low)
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

/// Arithmetic `>> 128` of a two's-complement Q128.128 value known to fit a tick
fn high_half_as_tick(x: U256) -> i32 {
    (x >> 128u32).low_u128() as i128 as i32
}

/// Check if a tick is valid for a given tick spacing
pub fn is_valid_tick(tick: i32, tick_spacing: i32) -> bool {
    tick_spacing > 0 && tick % tick_spacing == 0 && (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Get the nearest usable tick at-or-below (`less_than_or_equal`) or strictly above `tick`
pub fn get_next_valid_tick(tick: i32, tick_spacing: i32, less_than_or_equal: bool) -> i32 {
    let compressed = tick.div_euclid(tick_spacing);
    if less_than_or_equal {
        compressed * tick_spacing
    } else {
        (compressed + 1) * tick_spacing
    }
}
