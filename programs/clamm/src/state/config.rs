use crate::errors::ClammError;
use crate::state::fee_tier::FeeTier;
use crate::state::tick::tick_spacing_to_max_liquidity_per_tick;
use anchor_lang::prelude::*;

/// Immutable pool configuration, fixed at creation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Identity of the pool; also the account holding its token balances
    pub pool_id: Pubkey,

    /// Token 0 (must be < token 1)
    pub token_0: Pubkey,

    /// Token 1
    pub token_1: Pubkey,

    /// Fee rate in hundredths of a bip (3000 = 0.3%)
    pub fee: u32,

    /// Tick spacing for this pool
    pub tick_spacing: i32,

    /// Ceiling on gross liquidity referencing any single tick
    pub max_liquidity_per_tick: u128,

    /// Authority that can set and collect protocol fees
    pub protocol_authority: Pubkey,
}

impl PoolConfig {
    pub fn new(
        pool_id: Pubkey,
        token_0: Pubkey,
        token_1: Pubkey,
        fee_tier: FeeTier,
        protocol_authority: Pubkey,
    ) -> Result<Self> {
        require!(token_0 < token_1, ClammError::InvalidTokenOrder);
        fee_tier.validate()?;

        Ok(Self {
            pool_id,
            token_0,
            token_1,
            fee: fee_tier.fee,
            tick_spacing: fee_tier.tick_spacing,
            max_liquidity_per_tick: tick_spacing_to_max_liquidity_per_tick(fee_tier.tick_spacing),
            protocol_authority,
        })
    }

    /// Re-check a config that may not have come from `new`
    pub fn validate(&self) -> Result<()> {
        require!(self.token_0 < self.token_1, ClammError::InvalidTokenOrder);
        FeeTier {
            fee: self.fee,
            tick_spacing: self.tick_spacing,
        }
        .validate()?;
        require!(
            self.max_liquidity_per_tick == tick_spacing_to_max_liquidity_per_tick(self.tick_spacing),
            ClammError::InvalidTickSpacing
        );
        Ok(())
    }

    pub fn is_protocol_authority(&self, signer: &Pubkey) -> bool {
        self.protocol_authority == *signer
    }
}
