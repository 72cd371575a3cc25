use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::interfaces::SwapCallback;
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::swap_math::{calculate_fee_growth, calculate_protocol_fee, compute_swap_step};
use crate::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use crate::math::u256::U256;
use crate::state::{oracle, tick, tick_bitmap, TickGlobals};
use anchor_lang::prelude::*;

/// Swap parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    /// Receives the output token
    pub recipient: Pubkey,
    /// Token 0 in, token 1 out when true
    pub zero_for_one: bool,
    /// Positive for exact input, negative for exact output
    pub amount_specified: i128,
    /// The price may not move past this limit
    pub sqrt_price_limit_x96: U256,
    /// Minimum output (exact input) or maximum input (exact output)
    pub other_amount_threshold: Option<u128>,
    pub deadline: Option<u64>,
    /// Passed through to the swap callback
    pub data: Vec<u8>,
}

/// Swap outcome, deltas from the pool's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    /// Positive when the pool received token 0
    pub amount_0: i128,
    /// Positive when the pool received token 1
    pub amount_1: i128,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
}

/// Running state of the swap loop
struct SwapState {
    amount_remaining: i128,
    amount_calculated: i128,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
    fee_growth_global_x128: U256,
    protocol_fee: u128,
}

fn to_i128(amount: U256) -> Result<i128> {
    i128::try_from(amount.try_into_u128()?).map_err(|_| ClammError::CastOverflow.into())
}

/// Swap handler
///
/// Walks the price one initialized tick at a time until the specified amount
/// is used up or the price limit is reached, then pays the output and pulls
/// the input through the callback.
pub fn handler(
    ctx: &mut PoolContext,
    params: &SwapParams,
    callback: &mut dyn SwapCallback,
) -> Result<SwapResult> {
    ctx.check_deadline(params.deadline)?;
    require!(params.amount_specified != 0, ClammError::ZeroSwapAmount);

    let config = ctx.store.config()?;
    let start = ctx.store.state()?;
    let zero_for_one = params.zero_for_one;
    let exact_input = params.amount_specified > 0;
    let limit = params.sqrt_price_limit_x96;

    // Validate price limit direction
    if zero_for_one {
        require!(
            limit < start.sqrt_price_x96 && limit > MIN_SQRT_RATIO,
            ClammError::InvalidSqrtPriceLimit
        );
    } else {
        require!(
            limit > start.sqrt_price_x96 && limit < MAX_SQRT_RATIO,
            ClammError::InvalidSqrtPriceLimit
        );
    }

    let time = ctx.clock.timestamp();
    let fee_protocol = start.fee_protocol_for(zero_for_one);

    let mut state = SwapState {
        amount_remaining: params.amount_specified,
        amount_calculated: 0,
        sqrt_price_x96: start.sqrt_price_x96,
        tick: start.tick,
        liquidity: start.liquidity,
        fee_growth_global_x128: if zero_for_one {
            start.fee_growth_global_0_x128
        } else {
            start.fee_growth_global_1_x128
        },
        protocol_fee: 0,
    };

    // Oracle cumulatives as of the start of the swap, computed on first crossing
    let mut latest_observation: Option<(i64, U256)> = None;

    while state.amount_remaining != 0 && state.sqrt_price_x96 != limit {
        let sqrt_price_start = state.sqrt_price_x96;

        let (tick_next, initialized) = tick_bitmap::next_initialized_tick_within_one_word(
            &ctx.store,
            state.tick,
            config.tick_spacing,
            zero_for_one,
        )?;
        // The bitmap knows nothing of the tick bounds
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next)?;

        let target = if zero_for_one {
            sqrt_price_next.max(limit)
        } else {
            sqrt_price_next.min(limit)
        };

        let step = compute_swap_step(
            state.sqrt_price_x96,
            target,
            state.liquidity,
            state.amount_remaining,
            config.fee,
        )?;
        state.sqrt_price_x96 = step.sqrt_price_next_x96;

        let amount_in = to_i128(step.amount_in)?;
        let amount_out = to_i128(step.amount_out)?;
        let mut fee_amount = step.fee_amount;
        let fee = to_i128(fee_amount)?;

        if exact_input {
            state.amount_remaining = state
                .amount_remaining
                .checked_sub(amount_in)
                .and_then(|remaining| remaining.checked_sub(fee))
                .ok_or(ClammError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_sub(amount_out)
                .ok_or(ClammError::MathOverflow)?;
        } else {
            state.amount_remaining = state
                .amount_remaining
                .checked_add(amount_out)
                .ok_or(ClammError::MathOverflow)?;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(amount_in)
                .and_then(|calculated| calculated.checked_add(fee))
                .ok_or(ClammError::MathOverflow)?;
        }

        // Protocol takes its share before LPs
        let protocol_fee = calculate_protocol_fee(fee_amount, fee_protocol);
        if !protocol_fee.is_zero() {
            fee_amount = fee_amount - protocol_fee;
            state.protocol_fee = state
                .protocol_fee
                .checked_add(protocol_fee.try_into_u128()?)
                .ok_or(ClammError::MathOverflow)?;
        }

        if state.liquidity > 0 {
            state.fee_growth_global_x128 = state
                .fee_growth_global_x128
                .overflowing_add(calculate_fee_growth(fee_amount, state.liquidity)?)
                .0;
        }

        if state.sqrt_price_x96 == sqrt_price_next {
            if initialized {
                let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                    match latest_observation {
                        Some(observation) => observation,
                        None => {
                            let observation = oracle::observe_single(
                                &ctx.store,
                                time,
                                0,
                                start.tick,
                                start.observation_index,
                                start.liquidity,
                                start.observation_cardinality,
                            )?;
                            latest_observation = Some(observation);
                            observation
                        }
                    };

                let globals = TickGlobals {
                    fee_growth_global_0_x128: if zero_for_one {
                        state.fee_growth_global_x128
                    } else {
                        start.fee_growth_global_0_x128
                    },
                    fee_growth_global_1_x128: if zero_for_one {
                        start.fee_growth_global_1_x128
                    } else {
                        state.fee_growth_global_x128
                    },
                    seconds_per_liquidity_cumulative_x128,
                    tick_cumulative,
                    time,
                };

                let mut liquidity_net = tick::cross(&mut ctx.store, tick_next, &globals)?;
                // Moving left, the net liquidity applies in reverse
                if zero_for_one {
                    liquidity_net = liquidity_net
                        .checked_neg()
                        .ok_or(ClammError::LiquidityOverflow)?;
                }
                state.liquidity = add_liquidity_delta(state.liquidity, liquidity_net)?;
            }

            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x96 != sqrt_price_start {
            // Stopped between ticks
            state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
        }
    }

    // Write pool state back
    let mut pool = start;
    if state.tick != start.tick {
        let (index, cardinality) = oracle::write(
            &mut ctx.store,
            start.observation_index,
            time,
            start.tick,
            start.liquidity,
            start.observation_cardinality,
            start.observation_cardinality_next,
        )?;
        pool.observation_index = index;
        pool.observation_cardinality = cardinality;
    }
    pool.sqrt_price_x96 = state.sqrt_price_x96;
    pool.tick = state.tick;
    pool.liquidity = state.liquidity;

    if zero_for_one {
        pool.fee_growth_global_0_x128 = state.fee_growth_global_x128;
        pool.protocol_fees_0 = pool.protocol_fees_0.saturating_add(state.protocol_fee);
    } else {
        pool.fee_growth_global_1_x128 = state.fee_growth_global_x128;
        pool.protocol_fees_1 = pool.protocol_fees_1.saturating_add(state.protocol_fee);
    }
    ctx.store.set_state(&pool)?;

    let amount_used = params
        .amount_specified
        .checked_sub(state.amount_remaining)
        .ok_or(ClammError::MathOverflow)?;
    let (amount_0, amount_1) = if zero_for_one == exact_input {
        (amount_used, state.amount_calculated)
    } else {
        (state.amount_calculated, amount_used)
    };

    let (amount_in, amount_out) = if zero_for_one {
        (amount_0, amount_1)
    } else {
        (amount_1, amount_0)
    };
    let amount_in = amount_in.max(0).unsigned_abs();
    let amount_out = amount_out.min(0).unsigned_abs();

    // Slippage protection
    if let Some(threshold) = params.other_amount_threshold {
        if exact_input {
            require!(amount_out >= threshold, ClammError::OutputBelowMinimum);
        } else {
            require!(amount_in <= threshold, ClammError::InputExceedsMaximum);
        }
    }

    let (token_in, token_out) = if zero_for_one {
        (config.token_0, config.token_1)
    } else {
        (config.token_1, config.token_0)
    };

    if amount_out > 0 {
        let pool_id = ctx.store.pool_id();
        ctx.tokens
            .transfer(&token_out, &pool_id, &params.recipient, amount_out)?;
    }

    let balance_before = ctx.pool_balance(&token_in);
    callback.swap_callback(&mut *ctx.tokens, amount_0, amount_1, &params.data)?;
    let required = balance_before
        .checked_add(amount_in)
        .ok_or(ClammError::MathOverflow)?;
    require!(
        ctx.pool_balance(&token_in) >= required,
        ClammError::InsufficientInputAmount
    );

    msg!("Swap executed");
    msg!("Amount in: {}", amount_in);
    msg!("Amount out: {}", amount_out);
    msg!("New sqrt price: {}", state.sqrt_price_x96);
    msg!("New tick: {}", state.tick);

    Ok(SwapResult {
        amount_0,
        amount_1,
        sqrt_price_x96: state.sqrt_price_x96,
        tick: state.tick,
        liquidity: state.liquidity,
    })
}
