pub mod create_pool;
pub mod initialize_pool;
pub mod increase_observation_cardinality;
pub mod modify_position;
pub mod increase_liquidity;
pub mod decrease_liquidity;
pub mod collect_fees;
pub mod swap;
pub mod flash;
pub mod set_fee_protocol;
pub mod collect_protocol_fees;
pub mod observe;

pub use increase_liquidity::{MintParams, MintResult};
pub use decrease_liquidity::{BurnParams, BurnResult};
pub use collect_fees::{CollectParams, CollectResult};
pub use swap::{SwapParams, SwapResult};
pub use flash::{FlashParams, FlashResult};
pub use collect_protocol_fees::CollectProtocolParams;
pub use observe::CumulativesInside;

use crate::errors::ClammError;
use crate::interfaces::{BlockClock, TokenTransfer};
use crate::storage::PoolStore;
use anchor_lang::prelude::*;

/// Everything a handler may touch: the pool's records, the clock and the token ledger
pub struct PoolContext<'a> {
    pub store: PoolStore<'a>,
    pub clock: &'a dyn BlockClock,
    pub tokens: &'a mut dyn TokenTransfer,
}

impl PoolContext<'_> {
    /// Reject once the clock has passed the deadline
    pub fn check_deadline(&self, deadline: Option<u64>) -> Result<()> {
        if let Some(deadline) = deadline {
            require!(self.clock.now() <= deadline, ClammError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Balance the pool holds of a token
    pub fn pool_balance(&self, token: &Pubkey) -> u128 {
        self.tokens.balance_of(token, &self.store.pool_id())
    }
}
