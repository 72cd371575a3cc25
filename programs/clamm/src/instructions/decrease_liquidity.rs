use crate::errors::ClammError;
use crate::instructions::modify_position::modify_position;
use crate::instructions::PoolContext;
use crate::state::position::position_key;
use anchor_lang::prelude::*;

/// Parameters for removing liquidity from a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnParams {
    pub owner: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Liquidity to remove; zero only settles accrued fees
    pub amount: u128,
    pub amount_0_min: Option<u128>,
    pub amount_1_min: Option<u128>,
    pub deadline: Option<u64>,
}

/// Tokens released to the position's owed balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnResult {
    pub amount_0: u128,
    pub amount_1: u128,
}

/// Decrease liquidity handler
/// Released tokens are credited to the position and paid out by collect
pub fn handler(ctx: &mut PoolContext, params: &BurnParams) -> Result<BurnResult> {
    ctx.check_deadline(params.deadline)?;

    let config = ctx.store.config()?;
    let liquidity_delta = i128::try_from(params.amount)
        .map_err(|_| ClammError::CastOverflow)?
        .checked_neg()
        .ok_or(ClammError::MathOverflow)?;

    let result = modify_position(
        ctx,
        &config,
        &params.owner,
        params.tick_lower,
        params.tick_upper,
        liquidity_delta,
    )?;

    let amount_0 = result.amount_0.unsigned_abs();
    let amount_1 = result.amount_1.unsigned_abs();

    // Slippage protection
    if let Some(min) = params.amount_0_min {
        require!(amount_0 >= min, ClammError::Amount0BelowMin);
    }
    if let Some(min) = params.amount_1_min {
        require!(amount_1 >= min, ClammError::Amount1BelowMin);
    }

    if amount_0 > 0 || amount_1 > 0 {
        let mut position = result.position;
        position.tokens_owed_0 = position.tokens_owed_0.saturating_add(amount_0);
        position.tokens_owed_1 = position.tokens_owed_1.saturating_add(amount_1);
        let key = position_key(&params.owner, params.tick_lower, params.tick_upper);
        ctx.store.set_position(&key, &position)?;
    }

    msg!("Liquidity decreased: {}", params.amount);
    msg!("Range: [{}, {})", params.tick_lower, params.tick_upper);
    msg!("Token 0 released: {}", amount_0);
    msg!("Token 1 released: {}", amount_1);

    Ok(BurnResult { amount_0, amount_1 })
}
