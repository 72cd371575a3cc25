use crate::errors::ClammError;
use crate::math::full_math::{mul_div, Q128};
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::u256::U256;
use crate::storage::PoolStore;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

/// Liquidity position - an owner's concentrated liquidity in one tick range
/// Keyed by keccak256(owner || be32(tick_lower) || be32(tick_upper))
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PositionInfo {
    /// Amount of liquidity in this position
    pub liquidity: u128,

    /// Fee growth inside the position's range at last update (token 0)
    pub fee_growth_inside_0_last_x128: U256,

    /// Fee growth inside the position's range at last update (token 1)
    pub fee_growth_inside_1_last_x128: U256,

    /// Uncollected tokens owed to the position (token 0)
    pub tokens_owed_0: u128,

    /// Uncollected tokens owed to the position (token 1)
    pub tokens_owed_1: u128,
}

/// Position key for an owner and tick range
pub fn position_key(owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 + 4 + 4);
    buf.extend_from_slice(owner.as_ref());
    buf.extend_from_slice(&tick_lower.to_be_bytes());
    buf.extend_from_slice(&tick_upper.to_be_bytes());
    keccak::hash(&buf).0
}

/// Fees earned by `liquidity` over a growth delta, truncated to u128
fn fees_owed(
    fee_growth_inside_x128: U256,
    fee_growth_inside_last_x128: U256,
    liquidity: u128,
) -> Result<u128> {
    let fee_growth_delta = fee_growth_inside_x128
        .overflowing_sub(fee_growth_inside_last_x128)
        .0;
    Ok(mul_div(fee_growth_delta, U256::from(liquidity), Q128)?.low_u128())
}

impl PositionInfo {
    /// Check if position is empty (no liquidity and no owed tokens)
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }

    /// Accrue fees and apply a liquidity delta
    ///
    /// A zero delta is a poke and only allowed on a position with liquidity.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<()> {
        let liquidity_next = if liquidity_delta == 0 {
            require!(self.liquidity > 0, ClammError::NoPositionLiquidity);
            self.liquidity
        } else {
            add_liquidity_delta(self.liquidity, liquidity_delta)?
        };

        let tokens_owed_0 = fees_owed(
            fee_growth_inside_0_x128,
            self.fee_growth_inside_0_last_x128,
            self.liquidity,
        )?;
        let tokens_owed_1 = fees_owed(
            fee_growth_inside_1_x128,
            self.fee_growth_inside_1_last_x128,
            self.liquidity,
        )?;

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;

        // Owed amounts saturate instead of failing; owners must collect before u128::MAX
        self.tokens_owed_0 = self.tokens_owed_0.saturating_add(tokens_owed_0);
        self.tokens_owed_1 = self.tokens_owed_1.saturating_add(tokens_owed_1);

        Ok(())
    }
}

/// Load a position by owner and range
pub fn get(
    store: &PoolStore,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<PositionInfo> {
    store.position(&position_key(owner, tick_lower, tick_upper))
}

/// Update a stored position, returning the new record
pub fn update(
    store: &mut PoolStore,
    owner: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
    fee_growth_inside_0_x128: U256,
    fee_growth_inside_1_x128: U256,
) -> Result<PositionInfo> {
    let key = position_key(owner, tick_lower, tick_upper);
    let mut info = store.position(&key)?;
    info.update(liquidity_delta, fee_growth_inside_0_x128, fee_growth_inside_1_x128)?;
    store.set_position(&key, &info)?;
    Ok(info)
}
