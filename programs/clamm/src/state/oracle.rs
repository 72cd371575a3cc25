//! Oracle
//!
//! Ring buffer of cumulative tick and seconds-per-liquidity observations,
//! written at most once per block and queried by binary search with
//! linear interpolation between neighbouring observations.

use crate::constants::oracle::GROW_SENTINEL_TIMESTAMP;
use crate::errors::ClammError;
use crate::math::full_math::mul_div;
use crate::math::u256::U256;
use crate::storage::PoolStore;
use anchor_lang::prelude::*;

/// Oracle observation - stores TWAP data points
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Block timestamp of the observation
    pub block_timestamp: u32,

    /// Cumulative tick value (tick * time elapsed)
    pub tick_cumulative: i64,

    /// Cumulative seconds per in-range liquidity (X128)
    pub seconds_per_liquidity_cumulative_x128: U256,

    /// Whether this observation has been initialized
    pub initialized: bool,
}

impl Observation {
    /// Advance this observation to a later timestamp
    /// Liquidity of zero counts as one so the accumulator keeps moving
    pub fn transform(&self, block_timestamp: u32, tick: i32, liquidity: u128) -> Observation {
        let time_delta = block_timestamp.wrapping_sub(self.block_timestamp);

        let tick_cumulative = self
            .tick_cumulative
            .wrapping_add((tick as i64).wrapping_mul(time_delta as i64));

        let seconds_per_liquidity_delta =
            (U256::from(time_delta) << 128u32) / U256::from(liquidity.max(1));

        Observation {
            block_timestamp,
            tick_cumulative,
            seconds_per_liquidity_cumulative_x128: self
                .seconds_per_liquidity_cumulative_x128
                .overflowing_add(seconds_per_liquidity_delta)
                .0,
            initialized: true,
        }
    }
}

/// Seed the first slot, returning (cardinality, cardinality_next)
pub fn initialize(store: &mut PoolStore, time: u32) -> Result<(u16, u16)> {
    store.set_observation(
        0,
        &Observation {
            block_timestamp: time,
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::zero(),
            initialized: true,
        },
    )?;
    Ok((1, 1))
}

/// Write an observation for the current block
///
/// At most one observation is written per timestamp. The buffer only grows
/// into pre-allocated slots once the index reaches the end of the current
/// window. Returns the new (index, cardinality).
pub fn write(
    store: &mut PoolStore,
    index: u16,
    time: u32,
    tick: i32,
    liquidity: u128,
    cardinality: u16,
    cardinality_next: u16,
) -> Result<(u16, u16)> {
    let last = store.observation(index)?;

    // Early return if same timestamp
    if last.block_timestamp == time {
        return Ok((index, cardinality));
    }

    let cardinality_updated = if cardinality_next > cardinality && index == cardinality - 1 {
        cardinality_next
    } else {
        cardinality
    };

    let index_updated = ((index as u32 + 1) % cardinality_updated as u32) as u16;
    store.set_observation(index_updated, &last.transform(time, tick, liquidity))?;

    Ok((index_updated, cardinality_updated))
}

/// Pre-allocate slots up to `next`, returning the new cardinality_next
///
/// New slots get a sentinel timestamp and stay uninitialized.
pub fn grow(store: &mut PoolStore, current: u16, next: u16) -> Result<u16> {
    require!(current > 0, ClammError::OracleNotInitialized);

    if next <= current {
        return Ok(current);
    }

    for index in current..next {
        store.set_observation(
            index,
            &Observation {
                block_timestamp: GROW_SENTINEL_TIMESTAMP,
                ..Default::default()
            },
        )?;
    }
    Ok(next)
}

/// Chronological `a <= b` for 32-bit timestamps no later than `time`
///
/// Timestamps after `time` are taken to be from before the last wrap.
fn lte(time: u32, a: u32, b: u32) -> bool {
    if a <= time && b <= time {
        return a <= b;
    }

    let a_adjusted = if a > time { a as u64 } else { a as u64 + (1 << 32) };
    let b_adjusted = if b > time { b as u64 } else { b as u64 + (1 << 32) };
    a_adjusted <= b_adjusted
}

/// Find the observations at or before and at or after `target`
///
/// The caller guarantees the target lies between the oldest and newest
/// initialized observations.
fn binary_search(
    store: &PoolStore,
    time: u32,
    target: u32,
    index: u16,
    cardinality: u16,
) -> Result<(Observation, Observation)> {
    let cardinality = cardinality as u32;
    // Oldest observation
    let mut left = (index as u32 + 1) % cardinality;
    // Newest observation
    let mut right = left + cardinality - 1;

    loop {
        let mid = (left + right) / 2;

        let before_or_at = store.observation((mid % cardinality) as u16)?;

        // Landed on a slot that has not been written yet, search higher
        if !before_or_at.initialized {
            left = mid + 1;
            continue;
        }

        let at_or_after = store.observation(((mid + 1) % cardinality) as u16)?;

        let target_at_or_after = lte(time, before_or_at.block_timestamp, target);

        if target_at_or_after && lte(time, target, at_or_after.block_timestamp) {
            return Ok((before_or_at, at_or_after));
        }

        if !target_at_or_after {
            right = mid - 1;
        } else {
            left = mid + 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn get_surrounding_observations(
    store: &PoolStore,
    time: u32,
    target: u32,
    tick: i32,
    index: u16,
    liquidity: u128,
    cardinality: u16,
) -> Result<(Observation, Observation)> {
    // Optimistically start with the newest observation
    let newest = store.observation(index)?;

    if lte(time, newest.block_timestamp, target) {
        if newest.block_timestamp == target {
            return Ok((newest, Observation::default()));
        }
        return Ok((newest, newest.transform(target, tick, liquidity)));
    }

    // Slots past the index are unwritten until the buffer has wrapped once
    let mut oldest = store.observation(((index as u32 + 1) % cardinality as u32) as u16)?;
    if !oldest.initialized {
        oldest = store.observation(0)?;
    }

    require!(
        lte(time, oldest.block_timestamp, target),
        ClammError::OracleObservationStale
    );

    binary_search(store, time, target, index, cardinality)
}

/// Cumulatives as of `seconds_ago` seconds before `time`
///
/// Returns (tick_cumulative, seconds_per_liquidity_cumulative_x128). Queries
/// older than the oldest retained observation fail rather than extrapolate.
#[allow(clippy::too_many_arguments)]
pub fn observe_single(
    store: &PoolStore,
    time: u32,
    seconds_ago: u32,
    tick: i32,
    index: u16,
    liquidity: u128,
    cardinality: u16,
) -> Result<(i64, U256)> {
    require!(cardinality > 0, ClammError::OracleNotInitialized);

    if seconds_ago == 0 {
        let mut last = store.observation(index)?;
        if last.block_timestamp != time {
            last = last.transform(time, tick, liquidity);
        }
        return Ok((last.tick_cumulative, last.seconds_per_liquidity_cumulative_x128));
    }

    let target = time.wrapping_sub(seconds_ago);

    let (before_or_at, at_or_after) =
        get_surrounding_observations(store, time, target, tick, index, liquidity, cardinality)?;

    if target == before_or_at.block_timestamp {
        // At the left boundary
        Ok((
            before_or_at.tick_cumulative,
            before_or_at.seconds_per_liquidity_cumulative_x128,
        ))
    } else if target == at_or_after.block_timestamp {
        // At the right boundary
        Ok((
            at_or_after.tick_cumulative,
            at_or_after.seconds_per_liquidity_cumulative_x128,
        ))
    } else {
        // In the middle, interpolate linearly
        let observation_time_delta =
            at_or_after.block_timestamp.wrapping_sub(before_or_at.block_timestamp);
        let target_delta = target.wrapping_sub(before_or_at.block_timestamp);

        let tick_cumulative = before_or_at.tick_cumulative.wrapping_add(
            (at_or_after
                .tick_cumulative
                .wrapping_sub(before_or_at.tick_cumulative)
                / observation_time_delta as i64)
                .wrapping_mul(target_delta as i64),
        );

        let seconds_per_liquidity_delta = at_or_after
            .seconds_per_liquidity_cumulative_x128
            .overflowing_sub(before_or_at.seconds_per_liquidity_cumulative_x128)
            .0;
        let seconds_per_liquidity_cumulative_x128 = before_or_at
            .seconds_per_liquidity_cumulative_x128
            .overflowing_add(mul_div(
                seconds_per_liquidity_delta,
                U256::from(target_delta),
                U256::from(observation_time_delta),
            )?)
            .0;

        Ok((tick_cumulative, seconds_per_liquidity_cumulative_x128))
    }
}

/// Cumulatives for each of `seconds_agos`
#[allow(clippy::too_many_arguments)]
pub fn observe(
    store: &PoolStore,
    time: u32,
    seconds_agos: &[u32],
    tick: i32,
    index: u16,
    liquidity: u128,
    cardinality: u16,
) -> Result<Vec<(i64, U256)>> {
    require!(cardinality > 0, ClammError::OracleNotInitialized);

    seconds_agos
        .iter()
        .map(|seconds_ago| {
            observe_single(store, time, *seconds_ago, tick, index, liquidity, cardinality)
        })
        .collect()
}
