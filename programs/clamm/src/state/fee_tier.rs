use crate::constants::{fee_tiers, FEE_RATE_DENOMINATOR, MAX_TICK_SPACING};
use crate::errors::ClammError;
use anchor_lang::prelude::*;

/// Fee rate paired with the tick spacing it trades on
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeTier {
    /// Fee rate in hundredths of a basis point (100 = 0.01%)
    pub fee: u32,

    /// Tick spacing for this fee tier
    /// Lower fee = tighter spacing for stable pairs
    pub tick_spacing: i32,
}

impl FeeTier {
    pub const STANDARD: [FeeTier; 4] = [
        FeeTier { fee: fee_tiers::FEE_TIER_100, tick_spacing: fee_tiers::TICK_SPACING_100 },
        FeeTier { fee: fee_tiers::FEE_TIER_500, tick_spacing: fee_tiers::TICK_SPACING_500 },
        FeeTier { fee: fee_tiers::FEE_TIER_3000, tick_spacing: fee_tiers::TICK_SPACING_3000 },
        FeeTier { fee: fee_tiers::FEE_TIER_10000, tick_spacing: fee_tiers::TICK_SPACING_10000 },
    ];

    /// Look up a standard tier by fee rate
    pub fn standard(fee: u32) -> Option<FeeTier> {
        Self::STANDARD.iter().copied().find(|tier| tier.fee == fee)
    }

    /// Custom tier, validated the same way as the standard ones
    pub fn new(fee: u32, tick_spacing: i32) -> Result<FeeTier> {
        let tier = FeeTier { fee, tick_spacing };
        tier.validate()?;
        Ok(tier)
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.fee < FEE_RATE_DENOMINATOR, ClammError::FeeRateTooHigh);
        require!(
            self.tick_spacing > 0 && self.tick_spacing < MAX_TICK_SPACING,
            ClammError::InvalidTickSpacing
        );
        Ok(())
    }
}
