use crate::errors::ClammError;
use crate::instructions::PoolContext;
use crate::state::pack_fee_protocol;
use anchor_lang::prelude::*;

/// Set protocol fee handler
/// Each value is the denominator of the protocol's share of swap fees (0 = off)
pub fn handler(
    ctx: &mut PoolContext,
    caller: &Pubkey,
    fee_protocol_0: u8,
    fee_protocol_1: u8,
) -> Result<()> {
    let config = ctx.store.config()?;
    require!(config.is_protocol_authority(caller), ClammError::Unauthorized);

    let mut state = ctx.store.state()?;
    let old = state.fee_protocol;
    state.fee_protocol = pack_fee_protocol(fee_protocol_0, fee_protocol_1)?;
    ctx.store.set_state(&state)?;

    msg!("Protocol fee updated: {} -> {}", old, state.fee_protocol);

    Ok(())
}
