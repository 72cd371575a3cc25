use crate::instructions::PoolContext;
use crate::state::position::position_key;
use anchor_lang::prelude::*;

/// Parameters for withdrawing a position's owed tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectParams {
    pub owner: Pubkey,
    pub recipient: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Upper bound on token 0 to withdraw; capped at what is owed
    pub amount_0_requested: u128,
    /// Upper bound on token 1 to withdraw; capped at what is owed
    pub amount_1_requested: u128,
    pub deadline: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectResult {
    pub amount_0: u128,
    pub amount_1: u128,
}

/// Collect fees handler
/// Pays out owed tokens (fees and released principal) to the recipient
pub fn handler(ctx: &mut PoolContext, params: &CollectParams) -> Result<CollectResult> {
    ctx.check_deadline(params.deadline)?;

    let config = ctx.store.config()?;
    let pool_id = ctx.store.pool_id();
    let key = position_key(&params.owner, params.tick_lower, params.tick_upper);
    let mut position = ctx.store.position(&key)?;

    let amount_0 = params.amount_0_requested.min(position.tokens_owed_0);
    let amount_1 = params.amount_1_requested.min(position.tokens_owed_1);

    if amount_0 > 0 || amount_1 > 0 {
        position.tokens_owed_0 -= amount_0;
        position.tokens_owed_1 -= amount_1;
        ctx.store.set_position(&key, &position)?;
    }

    if amount_0 > 0 {
        ctx.tokens
            .transfer(&config.token_0, &pool_id, &params.recipient, amount_0)?;
    }
    if amount_1 > 0 {
        ctx.tokens
            .transfer(&config.token_1, &pool_id, &params.recipient, amount_1)?;
    }

    msg!("Collected token 0: {}", amount_0);
    msg!("Collected token 1: {}", amount_1);

    Ok(CollectResult { amount_0, amount_1 })
}
