use crate::instructions::PoolContext;
use crate::state::oracle;
use anchor_lang::prelude::*;

/// Grow the oracle buffer so it can retain at least `cardinality_next` observations
/// Returns the (old, new) target cardinality
pub fn handler(ctx: &mut PoolContext, cardinality_next: u16) -> Result<(u16, u16)> {
    let mut state = ctx.store.state()?;

    let old = state.observation_cardinality_next;
    let new = oracle::grow(&mut ctx.store, old, cardinality_next)?;

    if old != new {
        state.observation_cardinality_next = new;
        ctx.store.set_state(&state)?;
        msg!("Observation cardinality next: {} -> {}", old, new);
    }

    Ok((old, new))
}
