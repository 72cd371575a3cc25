use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::ClammError;
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::u256::U256;
use crate::storage::PoolStore;
use anchor_lang::prelude::*;

/// Tick data
/// Each initialized tick is a price point where in-range liquidity changes
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct TickInfo {
    /// Total liquidity referencing this tick
    /// Used to track when tick can be uninitialized
    pub liquidity_gross: u128,

    /// Net liquidity change when crossing this tick (positive = liquidity added)
    /// When price moves up through tick: add liquidity_net
    /// When price moves down through tick: subtract liquidity_net
    pub liquidity_net: i128,

    /// Fee growth on the other side of this tick (token 0)
    /// Stored relative to current tick for efficient range calculations
    pub fee_growth_outside_0_x128: U256,

    /// Fee growth on the other side of this tick (token 1)
    pub fee_growth_outside_1_x128: U256,

    /// Cumulative tick value on the other side of this tick
    pub tick_cumulative_outside: i64,

    /// Seconds per liquidity on the other side of this tick
    pub seconds_per_liquidity_outside_x128: U256,

    /// Seconds spent on the other side of this tick
    pub seconds_outside: u32,

    /// Whether this tick is initialized
    pub initialized: bool,
}

/// Global accumulators a tick snapshots when it is initialized or crossed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickGlobals {
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub seconds_per_liquidity_cumulative_x128: U256,
    pub tick_cumulative: i64,
    pub time: u32,
}

/// Maximum gross liquidity per tick for a tick spacing
/// Spreads u128::MAX evenly over every usable tick
pub fn tick_spacing_to_max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

impl TickInfo {
    /// Apply a liquidity delta at this tick
    ///
    /// Returns true when the tick flipped between initialized and uninitialized.
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        globals: &TickGlobals,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = add_liquidity_delta(liquidity_gross_before, liquidity_delta)?;

        require!(
            liquidity_gross_after <= max_liquidity,
            ClammError::TickLiquidityOverflow
        );

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // By convention, all growth before initialization happened below the tick
            if tick <= tick_current {
                self.fee_growth_outside_0_x128 = globals.fee_growth_global_0_x128;
                self.fee_growth_outside_1_x128 = globals.fee_growth_global_1_x128;
                self.seconds_per_liquidity_outside_x128 =
                    globals.seconds_per_liquidity_cumulative_x128;
                self.tick_cumulative_outside = globals.tick_cumulative;
                self.seconds_outside = globals.time;
            }
            self.initialized = true;
        }

        self.liquidity_gross = liquidity_gross_after;

        // When price moves up: lower adds liquidity, upper removes
        self.liquidity_net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(ClammError::LiquidityOverflow)?;

        Ok(flipped)
    }

    /// Flip the outside reference frame when price moves through the tick
    /// Returns the liquidity to apply when crossing left to right
    pub fn cross(&mut self, globals: &TickGlobals) -> i128 {
        self.fee_growth_outside_0_x128 = globals
            .fee_growth_global_0_x128
            .overflowing_sub(self.fee_growth_outside_0_x128)
            .0;
        self.fee_growth_outside_1_x128 = globals
            .fee_growth_global_1_x128
            .overflowing_sub(self.fee_growth_outside_1_x128)
            .0;
        self.seconds_per_liquidity_outside_x128 = globals
            .seconds_per_liquidity_cumulative_x128
            .overflowing_sub(self.seconds_per_liquidity_outside_x128)
            .0;
        self.tick_cumulative_outside = globals
            .tick_cumulative
            .wrapping_sub(self.tick_cumulative_outside);
        self.seconds_outside = globals.time.wrapping_sub(self.seconds_outside);
        self.liquidity_net
    }
}

/// Fee growth inside a tick range
///
/// Global growth minus the growth below the lower tick and above the upper
/// tick, each read from the outside fields or derived from them depending
/// on which side of the tick the price currently is.
pub fn get_fee_growth_inside(
    lower: &TickInfo,
    upper: &TickInfo,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let (fee_growth_below_0, fee_growth_below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128
                .overflowing_sub(lower.fee_growth_outside_0_x128)
                .0,
            fee_growth_global_1_x128
                .overflowing_sub(lower.fee_growth_outside_1_x128)
                .0,
        )
    };

    let (fee_growth_above_0, fee_growth_above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128
                .overflowing_sub(upper.fee_growth_outside_0_x128)
                .0,
            fee_growth_global_1_x128
                .overflowing_sub(upper.fee_growth_outside_1_x128)
                .0,
        )
    };

    (
        fee_growth_global_0_x128
            .overflowing_sub(fee_growth_below_0)
            .0
            .overflowing_sub(fee_growth_above_0)
            .0,
        fee_growth_global_1_x128
            .overflowing_sub(fee_growth_below_1)
            .0
            .overflowing_sub(fee_growth_above_1)
            .0,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// STORED TICK OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Update a stored tick, returning whether it flipped
#[allow(clippy::too_many_arguments)]
pub fn update(
    store: &mut PoolStore,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    globals: &TickGlobals,
    upper: bool,
    max_liquidity: u128,
) -> Result<bool> {
    let mut info = store.tick(tick)?;
    let flipped = info.update(tick, tick_current, liquidity_delta, globals, upper, max_liquidity)?;
    store.set_tick(tick, &info)?;
    Ok(flipped)
}

/// Cross a stored tick, returning its liquidity net
pub fn cross(store: &mut PoolStore, tick: i32, globals: &TickGlobals) -> Result<i128> {
    let mut info = store.tick(tick)?;
    let liquidity_net = info.cross(globals);
    store.set_tick(tick, &info)?;
    Ok(liquidity_net)
}

/// Reset a tick to its default (absent) state
pub fn clear(store: &mut PoolStore, tick: i32) {
    store.delete_tick(tick);
}

/// Fee growth inside a range of stored ticks
pub fn fee_growth_inside(
    store: &PoolStore,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> Result<(U256, U256)> {
    let lower = store.tick(tick_lower)?;
    let upper = store.tick(tick_upper)?;
    Ok(get_fee_growth_inside(
        &lower,
        &upper,
        tick_lower,
        tick_upper,
        tick_current,
        fee_growth_global_0_x128,
        fee_growth_global_1_x128,
    ))
}
