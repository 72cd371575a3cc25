use anchor_lang::error::Error;
use anchor_lang::prelude::*;

/// Concentrated liquidity core error codes
/// Every failure aborts the whole operation; `kind()` labels the failure reason
#[error_code]
pub enum ClammError {
    // ═══════════════════════════════════════════════════════════════════════
    // MATH ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Arithmetic overflow in checked operation
    #[msg("Math overflow")]
    MathOverflow,

    /// Arithmetic underflow in checked operation
    #[msg("Math underflow")]
    MathUnderflow,

    /// Division by zero attempted
    #[msg("Division by zero")]
    DivisionByZero,

    /// Result doesn't fit in expected type
    #[msg("Cast overflow")]
    CastOverflow,

    /// Quotient of a full-precision multiply-divide exceeds 256 bits
    #[msg("Multiplication overflow in fixed-point math")]
    MulDivOverflow,

    /// Bit scan of a zero word
    #[msg("Zero value has no set bit")]
    ZeroValue,

    // ═══════════════════════════════════════════════════════════════════════
    // TICK ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Tick outside [MIN_TICK, MAX_TICK]
    #[msg("Tick out of range")]
    TickOutOfRange,

    /// Tick is not aligned to tick spacing
    #[msg("Tick not aligned to spacing")]
    TickNotAligned,

    /// Lower tick must be less than upper tick
    #[msg("Lower tick must be less than upper tick")]
    InvalidTickRange,

    /// Gross liquidity referencing a tick exceeds the per-tick ceiling
    #[msg("Tick liquidity exceeds maximum")]
    TickLiquidityOverflow,

    /// Tick is not initialized
    #[msg("Tick not initialized")]
    TickNotInitialized,

    // ═══════════════════════════════════════════════════════════════════════
    // PRICE/LIQUIDITY ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Sqrt price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)
    #[msg("Sqrt price out of range")]
    SqrtPriceOutOfRange,

    /// Sqrt price is zero
    #[msg("Zero sqrt price")]
    ZeroSqrtPrice,

    /// Liquidity is zero where positive liquidity is required
    #[msg("Zero liquidity")]
    ZeroLiquidity,

    /// Liquidity delta would take liquidity below zero
    #[msg("Liquidity underflow")]
    LiquidityUnderflow,

    /// Liquidity delta would overflow
    #[msg("Liquidity overflow")]
    LiquidityOverflow,

    /// Not enough virtual reserves for the requested output
    #[msg("Insufficient liquidity")]
    InsufficientLiquidity,

    /// Swap amount is zero
    #[msg("Zero swap amount")]
    ZeroSwapAmount,

    /// Invalid sqrt price limit direction or bound
    #[msg("Invalid sqrt price limit")]
    InvalidSqrtPriceLimit,

    /// Mint amount is zero
    #[msg("Zero mint amount")]
    ZeroMintAmount,

    // ═══════════════════════════════════════════════════════════════════════
    // POSITION ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Fee poke on a position without liquidity
    #[msg("Position has no liquidity")]
    NoPositionLiquidity,

    // ═══════════════════════════════════════════════════════════════════════
    // POOL ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Pool already initialized
    #[msg("Pool already initialized")]
    PoolAlreadyInitialized,

    /// Pool not initialized
    #[msg("Pool not initialized")]
    PoolNotInitialized,

    /// A pool config is already stored under this id
    #[msg("Pool already exists")]
    PoolAlreadyExists,

    /// A pool config was not found under this id
    #[msg("Pool not found")]
    PoolNotFound,

    /// Invalid token order (token0 must be < token1)
    #[msg("Invalid token order")]
    InvalidTokenOrder,

    /// Stored record failed to decode
    #[msg("Corrupt storage record")]
    CorruptRecord,

    // ═══════════════════════════════════════════════════════════════════════
    // FEE ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Fee rate exceeds maximum
    #[msg("Fee rate too high")]
    FeeRateTooHigh,

    /// Tick spacing outside (0, MAX_TICK_SPACING)
    #[msg("Invalid tick spacing")]
    InvalidTickSpacing,

    /// Protocol fee denominator must be 0 or within 4..=10
    #[msg("Invalid protocol fee")]
    InvalidFeeProtocol,

    // ═══════════════════════════════════════════════════════════════════════
    // SLIPPAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Amount 0 exceeds maximum
    #[msg("Amount 0 exceeds maximum")]
    Amount0ExceedsMax,

    /// Amount 1 exceeds maximum
    #[msg("Amount 1 exceeds maximum")]
    Amount1ExceedsMax,

    /// Amount 0 below minimum
    #[msg("Amount 0 below minimum")]
    Amount0BelowMin,

    /// Amount 1 below minimum
    #[msg("Amount 1 below minimum")]
    Amount1BelowMin,

    /// Output below minimum
    #[msg("Output below minimum")]
    OutputBelowMinimum,

    /// Input exceeds maximum
    #[msg("Input exceeds maximum")]
    InputExceedsMaximum,

    // ═══════════════════════════════════════════════════════════════════════
    // PAYMENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Mint callback did not pay token 0
    #[msg("Insufficient token 0 payment")]
    InsufficientPayment0,

    /// Mint callback did not pay token 1
    #[msg("Insufficient token 1 payment")]
    InsufficientPayment1,

    /// Swap callback did not pay the input amount
    #[msg("Insufficient input amount")]
    InsufficientInputAmount,

    /// Flash callback did not repay token 0 plus fee
    #[msg("Flash loan token 0 not repaid")]
    FlashNotRepaid0,

    /// Flash callback did not repay token 1 plus fee
    #[msg("Flash loan token 1 not repaid")]
    FlashNotRepaid1,

    /// Token ledger balance too low for a transfer
    #[msg("Insufficient token balance")]
    InsufficientBalance,

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESS CONTROL ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Caller is not the protocol authority
    #[msg("Unauthorized")]
    Unauthorized,

    // ═══════════════════════════════════════════════════════════════════════
    // ORACLE / TIME ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Oracle not initialized
    #[msg("Oracle not initialized")]
    OracleNotInitialized,

    /// Requested observation predates the oldest retained one
    #[msg("Oracle observation stale")]
    OracleObservationStale,

    /// Caller-supplied deadline has passed
    #[msg("Deadline exceeded")]
    DeadlineExceeded,
}

/// Failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tick or tick-spacing alignment
    Alignment,
    /// Overflow, range and zero-value violations
    Range,
    /// Stale oracle queries and expired deadlines
    Staleness,
    /// Caller-supplied amount bounds violated
    Slippage,
    /// Caller lacks the required authority
    Authorization,
    /// Pool or record lifecycle violations
    State,
    /// A callback did not transfer what it owed
    Payment,
}

impl ClammError {
    const ALL: [ClammError; 46] = [
        ClammError::MathOverflow,
        ClammError::MathUnderflow,
        ClammError::DivisionByZero,
        ClammError::CastOverflow,
        ClammError::MulDivOverflow,
        ClammError::ZeroValue,
        ClammError::TickOutOfRange,
        ClammError::TickNotAligned,
        ClammError::InvalidTickRange,
        ClammError::TickLiquidityOverflow,
        ClammError::TickNotInitialized,
        ClammError::SqrtPriceOutOfRange,
        ClammError::ZeroSqrtPrice,
        ClammError::ZeroLiquidity,
        ClammError::LiquidityUnderflow,
        ClammError::LiquidityOverflow,
        ClammError::InsufficientLiquidity,
        ClammError::ZeroSwapAmount,
        ClammError::InvalidSqrtPriceLimit,
        ClammError::ZeroMintAmount,
        ClammError::NoPositionLiquidity,
        ClammError::PoolAlreadyInitialized,
        ClammError::PoolNotInitialized,
        ClammError::PoolAlreadyExists,
        ClammError::PoolNotFound,
        ClammError::InvalidTokenOrder,
        ClammError::CorruptRecord,
        ClammError::FeeRateTooHigh,
        ClammError::InvalidTickSpacing,
        ClammError::InvalidFeeProtocol,
        ClammError::Amount0ExceedsMax,
        ClammError::Amount1ExceedsMax,
        ClammError::Amount0BelowMin,
        ClammError::Amount1BelowMin,
        ClammError::OutputBelowMinimum,
        ClammError::InputExceedsMaximum,
        ClammError::InsufficientPayment0,
        ClammError::InsufficientPayment1,
        ClammError::InsufficientInputAmount,
        ClammError::FlashNotRepaid0,
        ClammError::FlashNotRepaid1,
        ClammError::InsufficientBalance,
        ClammError::Unauthorized,
        ClammError::OracleNotInitialized,
        ClammError::OracleObservationStale,
        ClammError::DeadlineExceeded,
    ];

    /// Classify this error into the reported failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        use ClammError::*;
        match self {
            TickNotAligned | InvalidTickRange | InvalidTickSpacing => ErrorKind::Alignment,
            OracleObservationStale | DeadlineExceeded => ErrorKind::Staleness,
            Amount0ExceedsMax | Amount1ExceedsMax | Amount0BelowMin | Amount1BelowMin
            | OutputBelowMinimum | InputExceedsMaximum => ErrorKind::Slippage,
            Unauthorized => ErrorKind::Authorization,
            PoolAlreadyInitialized | PoolNotInitialized | PoolAlreadyExists | PoolNotFound
            | CorruptRecord | OracleNotInitialized | TickNotInitialized
            | NoPositionLiquidity => ErrorKind::State,
            InsufficientPayment0 | InsufficientPayment1 | InsufficientInputAmount
            | FlashNotRepaid0 | FlashNotRepaid1 | InsufficientBalance => ErrorKind::Payment,
            _ => ErrorKind::Range,
        }
    }

    /// Look up the variant behind a numeric anchor error code
    pub fn from_code(code: u32) -> Option<ClammError> {
        Self::ALL.iter().copied().find(|e| u32::from(*e) == code)
    }
}

/// Numeric error code of a propagated error, if it was raised by this crate's enum
pub fn error_code(err: &Error) -> Option<u32> {
    match err {
        Error::AnchorError(e) => Some(e.error_code_number),
        _ => None,
    }
}

/// Classify a propagated error into the failure taxonomy
pub fn error_kind(err: &Error) -> Option<ErrorKind> {
    error_code(err)
        .and_then(ClammError::from_code)
        .map(|e| e.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for e in ClammError::ALL {
            assert_eq!(ClammError::from_code(u32::from(e)).map(u32::from), Some(u32::from(e)));
        }
    }

    #[test]
    fn test_error_kind_of_propagated_error() {
        let err: Error = ClammError::OracleObservationStale.into();
        assert_eq!(error_kind(&err), Some(ErrorKind::Staleness));

        let err: Error = ClammError::TickNotAligned.into();
        assert_eq!(error_kind(&err), Some(ErrorKind::Alignment));

        let err: Error = ClammError::MulDivOverflow.into();
        assert_eq!(error_kind(&err), Some(ErrorKind::Range));

        let err: Error = ClammError::Unauthorized.into();
        assert_eq!(error_kind(&err), Some(ErrorKind::Authorization));
    }
}
