use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::state::PoolConfig;
use anchor_lang::prelude::*;

/// Create pool handler
/// Stores the immutable configuration; the price is set by initialize
pub fn handler(ctx: &mut PoolContext, config: &PoolConfig) -> Result<()> {
    require!(!ctx.store.has_config(), ClammError::PoolAlreadyExists);
    require_keys_eq!(config.pool_id, ctx.store.pool_id(), ClammError::PoolNotFound);
    config.validate()?;

    ctx.store.set_config(config)?;

    msg!("Pool created");
    msg!("Token 0: {}", config.token_0);
    msg!("Token 1: {}", config.token_1);
    msg!("Fee rate: {}, tick spacing: {}", config.fee, config.tick_spacing);

    Ok(())
}
