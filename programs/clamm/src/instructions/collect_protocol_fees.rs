use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::instructions::CollectResult;
use anchor_lang::prelude::*;

/// Parameters for withdrawing accrued protocol fees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectProtocolParams {
    pub caller: Pubkey,
    pub recipient: Pubkey,
    pub amount_0_requested: u128,
    pub amount_1_requested: u128,
}

/// Collect protocol fees handler
pub fn handler(ctx: &mut PoolContext, params: &CollectProtocolParams) -> Result<CollectResult> {
    let config = ctx.store.config()?;
    require!(
        config.is_protocol_authority(&params.caller),
        ClammError::Unauthorized
    );

    let mut state = ctx.store.state()?;
    let amount_0 = params.amount_0_requested.min(state.protocol_fees_0);
    let amount_1 = params.amount_1_requested.min(state.protocol_fees_1);

    state.protocol_fees_0 -= amount_0;
    state.protocol_fees_1 -= amount_1;
    ctx.store.set_state(&state)?;

    let pool_id = ctx.store.pool_id();
    if amount_0 > 0 {
        ctx.tokens
            .transfer(&config.token_0, &pool_id, &params.recipient, amount_0)?;
    }
    if amount_1 > 0 {
        ctx.tokens
            .transfer(&config.token_1, &pool_id, &params.recipient, amount_1)?;
    }

    msg!("Protocol fees collected: {} token 0, {} token 1", amount_0, amount_1);

    Ok(CollectResult { amount_0, amount_1 })
}
