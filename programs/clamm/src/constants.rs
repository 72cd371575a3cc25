// Concentrated liquidity core constants
// Following Uniswap V3 conventions: Q64.96 sqrt prices, X128 accumulators

use crate::math::u256::U256;

/// Minimum tick index (p(i) = 1.0001^i)
pub const MIN_TICK: i32 = -887272;

/// Maximum tick index
pub const MAX_TICK: i32 = -MIN_TICK;

/// Sqrt ratio at MIN_TICK (Q64.96)
pub const MIN_SQRT_RATIO: U256 = U256([4295128739, 0, 0, 0]);

/// Sqrt ratio at MAX_TICK (Q64.96)
/// = 1461446703485210103287273052203988822378723970342
pub const MAX_SQRT_RATIO: U256 = U256([6743328256752651558, 17280870778742802505, 4294805859, 0]);

/// Fee denominator: fees are expressed in hundredths of a bip (3000 = 0.3%)
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Maximum tick spacing
pub const MAX_TICK_SPACING: i32 = 16384;

/// Standard fee tiers
pub mod fee_tiers {
    /// 0.01% fee (tick spacing 1) - for stable pairs
    pub const FEE_TIER_100: u32 = 100;
    pub const TICK_SPACING_100: i32 = 1;

    /// 0.05% fee (tick spacing 10)
    pub const FEE_TIER_500: u32 = 500;
    pub const TICK_SPACING_500: i32 = 10;

    /// 0.30% fee (tick spacing 60) - for most pairs
    pub const FEE_TIER_3000: u32 = 3000;
    pub const TICK_SPACING_3000: i32 = 60;

    /// 1.00% fee (tick spacing 200) - for exotic pairs
    pub const FEE_TIER_10000: u32 = 10000;
    pub const TICK_SPACING_10000: i32 = 200;
}

/// Protocol fee: 1/n of the swap fee, n in MIN..=MAX or 0 for off
pub mod protocol_fee {
    pub const MIN_DENOMINATOR: u8 = 4;
    pub const MAX_DENOMINATOR: u8 = 10;
}

/// Storage key tags, one per record family
pub mod tags {
    pub const CONFIG: &[u8] = b"config";
    pub const STATE: &[u8] = b"state";
    pub const TICK: &[u8] = b"tick";
    pub const BITMAP: &[u8] = b"bitmap";
    pub const POSITION: &[u8] = b"position";
    pub const OBSERVATION: &[u8] = b"observation";
}

/// Oracle constants
pub mod oracle {
    /// Maximum number of observations in the oracle
    pub const OBSERVATION_CARDINALITY_MAX: u16 = 65535;
    /// Initial observation cardinality
    pub const OBSERVATION_CARDINALITY_INIT: u16 = 1;
    /// Timestamp written into pre-grown slots so that later writes touch a non-empty record
    pub const GROW_SENTINEL_TIMESTAMP: u32 = 1;
}
