use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::math::u256::U256;
use crate::state::{oracle, PoolState};
use anchor_lang::prelude::*;

/// Initialize pool handler
/// Sets the starting price and seeds the oracle
pub fn handler(ctx: &mut PoolContext, sqrt_price_x96: U256) -> Result<()> {
    // Config must exist before the pool can be priced
    ctx.store.config()?;
    require!(
        ctx.store.try_state()?.is_none(),
        ClammError::PoolAlreadyInitialized
    );

    // Also validates the price range
    let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;

    let (cardinality, cardinality_next) = oracle::initialize(&mut ctx.store, ctx.clock.timestamp())?;

    let state = PoolState {
        sqrt_price_x96,
        tick,
        observation_index: 0,
        observation_cardinality: cardinality,
        observation_cardinality_next: cardinality_next,
        ..Default::default()
    };
    ctx.store.set_state(&state)?;

    msg!("Pool initialized");
    msg!("Initial sqrt price: {}", sqrt_price_x96);
    msg!("Initial tick: {}", tick);

    Ok(())
}
