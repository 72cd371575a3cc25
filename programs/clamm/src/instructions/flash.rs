use crate::constants::FEE_RATE_DENOMINATOR;
use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::interfaces::FlashCallback;
use crate::math::full_math::mul_div_rounding_up;
use crate::math::swap_math::{calculate_fee_growth, calculate_protocol_fee};
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Flash loan parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashParams {
    pub recipient: Pubkey,
    pub amount_0: u128,
    pub amount_1: u128,
    /// Passed through to the flash callback
    pub data: Vec<u8>,
}

/// Fees actually paid on top of the principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashResult {
    pub paid_0: u128,
    pub paid_1: u128,
}

fn flash_fee(amount: u128, fee: u32) -> Result<u128> {
    mul_div_rounding_up(
        U256::from(amount),
        U256::from(fee),
        U256::from(FEE_RATE_DENOMINATOR),
    )?
    .try_into_u128()
}

/// Flash handler
/// Lends both tokens for the duration of the callback; repaid fees go to in-range LPs
pub fn handler(
    ctx: &mut PoolContext,
    params: &FlashParams,
    callback: &mut dyn FlashCallback,
) -> Result<FlashResult> {
    let config = ctx.store.config()?;
    let mut state = ctx.store.state()?;
    require!(state.liquidity > 0, ClammError::ZeroLiquidity);

    let fee_0 = flash_fee(params.amount_0, config.fee)?;
    let fee_1 = flash_fee(params.amount_1, config.fee)?;

    let balance_0_before = ctx.pool_balance(&config.token_0);
    let balance_1_before = ctx.pool_balance(&config.token_1);

    let pool_id = ctx.store.pool_id();
    if params.amount_0 > 0 {
        ctx.tokens
            .transfer(&config.token_0, &pool_id, &params.recipient, params.amount_0)?;
    }
    if params.amount_1 > 0 {
        ctx.tokens
            .transfer(&config.token_1, &pool_id, &params.recipient, params.amount_1)?;
    }

    callback.flash_callback(&mut *ctx.tokens, fee_0, fee_1, &params.data)?;

    let balance_0_after = ctx.pool_balance(&config.token_0);
    let balance_1_after = ctx.pool_balance(&config.token_1);

    let required_0 = balance_0_before
        .checked_add(fee_0)
        .ok_or(ClammError::MathOverflow)?;
    let required_1 = balance_1_before
        .checked_add(fee_1)
        .ok_or(ClammError::MathOverflow)?;
    require!(balance_0_after >= required_0, ClammError::FlashNotRepaid0);
    require!(balance_1_after >= required_1, ClammError::FlashNotRepaid1);

    // Anything paid beyond the principal counts as fees
    let paid_0 = balance_0_after - balance_0_before;
    let paid_1 = balance_1_after - balance_1_before;

    if paid_0 > 0 {
        let protocol = calculate_protocol_fee(U256::from(paid_0), state.fee_protocol_0());
        state.protocol_fees_0 = state
            .protocol_fees_0
            .saturating_add(protocol.try_into_u128()?);
        state.fee_growth_global_0_x128 = state
            .fee_growth_global_0_x128
            .overflowing_add(calculate_fee_growth(
                U256::from(paid_0) - protocol,
                state.liquidity,
            )?)
            .0;
    }
    if paid_1 > 0 {
        let protocol = calculate_protocol_fee(U256::from(paid_1), state.fee_protocol_1());
        state.protocol_fees_1 = state
            .protocol_fees_1
            .saturating_add(protocol.try_into_u128()?);
        state.fee_growth_global_1_x128 = state
            .fee_growth_global_1_x128
            .overflowing_add(calculate_fee_growth(
                U256::from(paid_1) - protocol,
                state.liquidity,
            )?)
            .0;
    }
    ctx.store.set_state(&state)?;

    msg!("Flash loan: {} token 0, {} token 1", params.amount_0, params.amount_1);
    msg!("Fees paid: {} token 0, {} token 1", paid_0, paid_1);

    Ok(FlashResult { paid_0, paid_1 })
}
