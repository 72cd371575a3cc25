use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::math::sqrt_price_math::{get_amount_0_delta_signed, get_amount_1_delta_signed};
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::state::{oracle, position, tick, tick_bitmap, PoolConfig, PositionInfo, TickGlobals};
use anchor_lang::prelude::*;

/// Outcome of a liquidity change on one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyPositionResult {
    /// Position record after the change
    pub position: PositionInfo,
    /// Token 0 owed to the pool (positive) or released to the owner (negative)
    pub amount_0: i128,
    /// Token 1 owed to the pool (positive) or released to the owner (negative)
    pub amount_1: i128,
}

/// Validate a tick range against the pool's bounds and spacing
pub fn check_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<()> {
    require!(tick_lower < tick_upper, ClammError::InvalidTickRange);
    require!(tick_lower >= MIN_TICK, ClammError::TickOutOfRange);
    require!(tick_upper <= MAX_TICK, ClammError::TickOutOfRange);
    require!(
        tick_lower % tick_spacing == 0 && tick_upper % tick_spacing == 0,
        ClammError::TickNotAligned
    );
    Ok(())
}

/// Apply a liquidity delta to a position and its boundary ticks
///
/// Shared by mint and burn. Updates the tick ledger and bitmap, settles the
/// position's fees, and when the range contains the current tick, writes an
/// oracle observation and adjusts in-range liquidity. Returns the signed token
/// amounts implied by the delta at the current price.
pub fn modify_position(
    ctx: &mut PoolContext,
    config: &PoolConfig,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
) -> Result<ModifyPositionResult> {
    check_ticks(tick_lower, tick_upper, config.tick_spacing)?;

    let mut state = ctx.store.state()?;
    let time = ctx.clock.timestamp();

    let mut flipped_lower = false;
    let mut flipped_upper = false;

    if liquidity_delta != 0 {
        let (tick_cumulative, seconds_per_liquidity_cumulative_x128) = oracle::observe_single(
            &ctx.store,
            time,
            0,
            state.tick,
            state.observation_index,
            state.liquidity,
            state.observation_cardinality,
        )?;

        let globals = TickGlobals {
            fee_growth_global_0_x128: state.fee_growth_global_0_x128,
            fee_growth_global_1_x128: state.fee_growth_global_1_x128,
            seconds_per_liquidity_cumulative_x128,
            tick_cumulative,
            time,
        };

        flipped_lower = tick::update(
            &mut ctx.store,
            tick_lower,
            state.tick,
            liquidity_delta,
            &globals,
            false,
            config.max_liquidity_per_tick,
        )?;
        flipped_upper = tick::update(
            &mut ctx.store,
            tick_upper,
            state.tick,
            liquidity_delta,
            &globals,
            true,
            config.max_liquidity_per_tick,
        )?;

        if flipped_lower {
            tick_bitmap::flip_tick(&mut ctx.store, tick_lower, config.tick_spacing)?;
        }
        if flipped_upper {
            tick_bitmap::flip_tick(&mut ctx.store, tick_upper, config.tick_spacing)?;
        }
    }

    let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = tick::fee_growth_inside(
        &ctx.store,
        tick_lower,
        tick_upper,
        state.tick,
        state.fee_growth_global_0_x128,
        state.fee_growth_global_1_x128,
    )?;

    let position = position::update(
        &mut ctx.store,
        owner,
        tick_lower,
        tick_upper,
        liquidity_delta,
        fee_growth_inside_0_x128,
        fee_growth_inside_1_x128,
    )?;

    // Removing the last liquidity leaves nothing for the tick to track
    if liquidity_delta < 0 {
        if flipped_lower {
            tick::clear(&mut ctx.store, tick_lower);
        }
        if flipped_upper {
            tick::clear(&mut ctx.store, tick_upper);
        }
    }

    let mut amount_0 = 0;
    let mut amount_1 = 0;

    if liquidity_delta != 0 {
        let sqrt_ratio_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_ratio_upper = get_sqrt_ratio_at_tick(tick_upper)?;

        if state.tick < tick_lower {
            // Range above the price: all token 0
            amount_0 =
                get_amount_0_delta_signed(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?;
        } else if state.tick < tick_upper {
            let (index, cardinality) = oracle::write(
                &mut ctx.store,
                state.observation_index,
                time,
                state.tick,
                state.liquidity,
                state.observation_cardinality,
                state.observation_cardinality_next,
            )?;
            state.observation_index = index;
            state.observation_cardinality = cardinality;

            amount_0 = get_amount_0_delta_signed(
                state.sqrt_price_x96,
                sqrt_ratio_upper,
                liquidity_delta,
            )?;
            amount_1 = get_amount_1_delta_signed(
                sqrt_ratio_lower,
                state.sqrt_price_x96,
                liquidity_delta,
            )?;

            state.update_liquidity(liquidity_delta)?;
            ctx.store.set_state(&state)?;
        } else {
            // Range below the price: all token 1
            amount_1 =
                get_amount_1_delta_signed(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?;
        }
    }

    Ok(ModifyPositionResult {
        position,
        amount_0,
        amount_1,
    })
}
