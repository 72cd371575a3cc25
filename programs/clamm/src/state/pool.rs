use crate::constants::protocol_fee;
use crate::errors::ClammError;
use crate::math::liquidity_math::add_liquidity_delta;
use crate::math::u256::U256;
use anchor_lang::prelude::*;

/// Pool state - the mutable core of the AMM for one token pair
/// Absent from storage until the pool is initialized
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PoolState {
    /// Current sqrt price as Q64.96 fixed point
    pub sqrt_price_x96: U256,

    /// Current tick index
    pub tick: i32,

    /// Index of the most recently written observation
    pub observation_index: u16,

    /// Number of populated observations
    pub observation_cardinality: u16,

    /// Next observation cardinality (for expansion)
    pub observation_cardinality_next: u16,

    /// Protocol fee denominators, token 0 in the low nibble, token 1 in the high nibble
    pub fee_protocol: u8,

    /// Global fee growth for token 0 (X128)
    pub fee_growth_global_0_x128: U256,

    /// Global fee growth for token 1 (X128)
    pub fee_growth_global_1_x128: U256,

    /// Protocol fees accumulated for token 0
    pub protocol_fees_0: u128,

    /// Protocol fees accumulated for token 1
    pub protocol_fees_1: u128,

    /// Total liquidity currently in range
    pub liquidity: u128,
}

impl PoolState {
    /// Protocol fee denominator for token 0 (0 = off)
    pub fn fee_protocol_0(&self) -> u8 {
        self.fee_protocol % 16
    }

    /// Protocol fee denominator for token 1 (0 = off)
    pub fn fee_protocol_1(&self) -> u8 {
        self.fee_protocol >> 4
    }

    /// Protocol fee denominator for the input token of a swap
    pub fn fee_protocol_for(&self, zero_for_one: bool) -> u8 {
        if zero_for_one {
            self.fee_protocol_0()
        } else {
            self.fee_protocol_1()
        }
    }

    /// Update liquidity, handling the signed delta
    pub fn update_liquidity(&mut self, delta: i128) -> Result<()> {
        self.liquidity = add_liquidity_delta(self.liquidity, delta)?;
        Ok(())
    }
}

/// Pack two protocol fee denominators into one byte
/// Each must be 0 (off) or between 4 and 10 inclusive
pub fn pack_fee_protocol(fee_protocol_0: u8, fee_protocol_1: u8) -> Result<u8> {
    let valid = |fee: u8| {
        fee == 0 || (protocol_fee::MIN_DENOMINATOR..=protocol_fee::MAX_DENOMINATOR).contains(&fee)
    };
    require!(
        valid(fee_protocol_0) && valid(fee_protocol_1),
        ClammError::InvalidFeeProtocol
    );
    Ok(fee_protocol_0 + (fee_protocol_1 << 4))
}
