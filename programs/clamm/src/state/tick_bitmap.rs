//! Tick bitmap
//!
//! Packed initialized flags for ticks compressed by tick spacing, one
//! 256-bit word per 256 compressed ticks.

use crate::errors::ClammError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use crate::math::u256::U256;
use crate::storage::PoolStore;
use anchor_lang::prelude::*;

/// Word index and bit position of a compressed tick
/// Arithmetic shift keeps negative ticks rounding toward negative infinity
pub fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, (compressed & 0xff) as u8)
}

/// Compress a tick by the spacing, rounding toward negative infinity
pub fn compress(tick: i32, tick_spacing: i32) -> i32 {
    let mut compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }
    compressed
}

/// Toggle the initialized flag of a tick
pub fn flip_tick(store: &mut PoolStore, tick: i32, tick_spacing: i32) -> Result<()> {
    require!(tick % tick_spacing == 0, ClammError::TickNotAligned);

    let (word_pos, bit_pos) = position(tick / tick_spacing);
    let mask = U256::one() << bit_pos as u32;
    let word = store.bitmap_word(word_pos)?;
    store.set_bitmap_word(word_pos, word ^ mask)
}

/// Whether a tick's flag is set
pub fn is_initialized(store: &PoolStore, tick: i32, tick_spacing: i32) -> Result<bool> {
    let (word_pos, bit_pos) = position(compress(tick, tick_spacing));
    let word = store.bitmap_word(word_pos)?;
    Ok(!(word & (U256::one() << bit_pos as u32)).is_zero())
}

/// Find the next initialized tick in the same word as `tick`
///
/// Searching left (`lte`) returns the nearest initialized tick at or below
/// `tick`; searching right returns the nearest one strictly above. When the
/// word holds none, the word boundary in the search direction is returned
/// with `false`, so the caller can step one word at a time.
pub fn next_initialized_tick_within_one_word(
    store: &PoolStore,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool)> {
    let compressed = compress(tick, tick_spacing);

    if lte {
        let (word_pos, bit_pos) = position(compressed);
        // All bits at or right of the current position
        let bit = U256::one() << bit_pos as u32;
        let mask = (bit - U256::one()) + bit;
        let masked = store.bitmap_word(word_pos)? & mask;

        let initialized = !masked.is_zero();
        let next = if initialized {
            (compressed - (bit_pos - most_significant_bit(masked)?) as i32) * tick_spacing
        } else {
            (compressed - bit_pos as i32) * tick_spacing
        };
        Ok((next, initialized))
    } else {
        // Start from the next tick, the current one is already passed
        let (word_pos, bit_pos) = position(compressed + 1);
        // All bits at or left of the current position
        let mask = !((U256::one() << bit_pos as u32) - U256::one());
        let masked = store.bitmap_word(word_pos)? & mask;

        let initialized = !masked.is_zero();
        let next = if initialized {
            (compressed + 1 + (least_significant_bit(masked)? - bit_pos) as i32) * tick_spacing
        } else {
            (compressed + 1 + (u8::MAX - bit_pos) as i32) * tick_spacing
        };
        Ok((next, initialized))
    }
}
