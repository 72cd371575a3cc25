use crate::errors::ClammError;
use crate::instructions::modify_position::modify_position;
use crate::instructions::PoolContext;
use crate::interfaces::MintCallback;
use anchor_lang::prelude::*;

/// Parameters for adding liquidity to a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParams {
    /// Owner of the position the liquidity is credited to
    pub recipient: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Liquidity to add
    pub amount: u128,
    /// Maximum token 0 the caller is willing to pay
    pub amount_0_max: Option<u128>,
    /// Maximum token 1 the caller is willing to pay
    pub amount_1_max: Option<u128>,
    pub deadline: Option<u64>,
    /// Passed through to the mint callback
    pub data: Vec<u8>,
}

/// Tokens paid for the minted liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintResult {
    pub amount_0: u128,
    pub amount_1: u128,
}

/// Increase liquidity handler
/// Credits the liquidity first, then pulls payment through the callback
pub fn handler(
    ctx: &mut PoolContext,
    params: &MintParams,
    callback: &mut dyn MintCallback,
) -> Result<MintResult> {
    ctx.check_deadline(params.deadline)?;
    require!(params.amount > 0, ClammError::ZeroMintAmount);

    let config = ctx.store.config()?;
    let liquidity_delta = i128::try_from(params.amount).map_err(|_| ClammError::CastOverflow)?;

    let result = modify_position(
        ctx,
        &config,
        &params.recipient,
        params.tick_lower,
        params.tick_upper,
        liquidity_delta,
    )?;

    // Adding liquidity never releases tokens
    let amount_0 = result.amount_0.unsigned_abs();
    let amount_1 = result.amount_1.unsigned_abs();

    // Slippage protection
    if let Some(max) = params.amount_0_max {
        require!(amount_0 <= max, ClammError::Amount0ExceedsMax);
    }
    if let Some(max) = params.amount_1_max {
        require!(amount_1 <= max, ClammError::Amount1ExceedsMax);
    }

    let balance_0_before = ctx.pool_balance(&config.token_0);
    let balance_1_before = ctx.pool_balance(&config.token_1);

    callback.mint_callback(&mut *ctx.tokens, amount_0, amount_1, &params.data)?;

    if amount_0 > 0 {
        let required = balance_0_before
            .checked_add(amount_0)
            .ok_or(ClammError::MathOverflow)?;
        require!(
            ctx.pool_balance(&config.token_0) >= required,
            ClammError::InsufficientPayment0
        );
    }
    if amount_1 > 0 {
        let required = balance_1_before
            .checked_add(amount_1)
            .ok_or(ClammError::MathOverflow)?;
        require!(
            ctx.pool_balance(&config.token_1) >= required,
            ClammError::InsufficientPayment1
        );
    }

    msg!("Liquidity increased: {}", params.amount);
    msg!("Range: [{}, {})", params.tick_lower, params.tick_upper);
    msg!("Token 0 deposited: {}", amount_0);
    msg!("Token 1 deposited: {}", amount_1);

    Ok(MintResult { amount_0, amount_1 })
}
