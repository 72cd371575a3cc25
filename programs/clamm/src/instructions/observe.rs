use crate::errors::ClammError;
use crate::instructions::modify_position::check_ticks;
use crate::instructions::PoolContext;
use crate::math::u256::U256;
use crate::state::oracle;
use anchor_lang::prelude::*;

/// Time-weighted accumulators for the span the price spent inside a range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CumulativesInside {
    pub tick_cumulative_inside: i64,
    pub seconds_per_liquidity_inside_x128: U256,
    pub seconds_inside: u32,
}

/// Observe handler
/// Returns (tick_cumulative, seconds_per_liquidity_cumulative_x128) for each age
pub fn handler(ctx: &PoolContext, seconds_agos: &[u32]) -> Result<Vec<(i64, U256)>> {
    let state = ctx.store.state()?;
    oracle::observe(
        &ctx.store,
        ctx.clock.timestamp(),
        seconds_agos,
        state.tick,
        state.observation_index,
        state.liquidity,
        state.observation_cardinality,
    )
}

/// Snapshot the accumulators inside a range
///
/// Only differences between two snapshots of the same range are meaningful;
/// the absolute values depend on when the boundary ticks were initialized.
pub fn snapshot_cumulatives_inside(
    ctx: &PoolContext,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<CumulativesInside> {
    let config = ctx.store.config()?;
    check_ticks(tick_lower, tick_upper, config.tick_spacing)?;

    let lower = ctx.store.tick(tick_lower)?;
    let upper = ctx.store.tick(tick_upper)?;
    require!(
        lower.initialized && upper.initialized,
        ClammError::TickNotInitialized
    );

    let state = ctx.store.state()?;

    let inside = if state.tick < tick_lower {
        CumulativesInside {
            tick_cumulative_inside: lower
                .tick_cumulative_outside
                .wrapping_sub(upper.tick_cumulative_outside),
            seconds_per_liquidity_inside_x128: lower
                .seconds_per_liquidity_outside_x128
                .overflowing_sub(upper.seconds_per_liquidity_outside_x128)
                .0,
            seconds_inside: lower.seconds_outside.wrapping_sub(upper.seconds_outside),
        }
    } else if state.tick < tick_upper {
        let time = ctx.clock.timestamp();
        let (tick_cumulative, seconds_per_liquidity_cumulative_x128) = oracle::observe_single(
            &ctx.store,
            time,
            0,
            state.tick,
            state.observation_index,
            state.liquidity,
            state.observation_cardinality,
        )?;
        CumulativesInside {
            tick_cumulative_inside: tick_cumulative
                .wrapping_sub(lower.tick_cumulative_outside)
                .wrapping_sub(upper.tick_cumulative_outside),
            seconds_per_liquidity_inside_x128: seconds_per_liquidity_cumulative_x128
                .overflowing_sub(lower.seconds_per_liquidity_outside_x128)
                .0
                .overflowing_sub(upper.seconds_per_liquidity_outside_x128)
                .0,
            seconds_inside: time
                .wrapping_sub(lower.seconds_outside)
                .wrapping_sub(upper.seconds_outside),
        }
    } else {
        CumulativesInside {
            tick_cumulative_inside: upper
                .tick_cumulative_outside
                .wrapping_sub(lower.tick_cumulative_outside),
            seconds_per_liquidity_inside_x128: upper
                .seconds_per_liquidity_outside_x128
                .overflowing_sub(lower.seconds_per_liquidity_outside_x128)
                .0,
            seconds_inside: upper.seconds_outside.wrapping_sub(lower.seconds_outside),
        }
    };

    Ok(inside)
}
