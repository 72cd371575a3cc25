//! clamm - Concentrated Liquidity AMM core
//!
//! The pricing and accounting engine of a Uniswap V3 style pool, written
//! against injected collaborators instead of a particular chain runtime.
//!
//! ## Architecture
//!
//! - **Math**: Q64.96 sqrt prices, X128 fee growth, 512-bit `mul_div`
//! - **Tick ledger + bitmap**: sparse per-tick liquidity with word-packed initialized flags
//! - **Positions**: keyed by a hash of (owner, lower, upper), fees settled lazily
//! - **TWAP Oracle**: growable ring buffer of cumulative tick and seconds-per-liquidity
//! - **Collaborators**: `Storage`, `BlockClock`, `TokenTransfer` and payment callbacks
//!
//! ## Atomicity
//!
//! Every entry point stages its storage writes in a `storage::Transaction`
//! and its token transfers in an `interfaces::TokenJournal`, and applies both
//! only on success. A failed operation moves no tokens and changes no records.

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod instructions;
pub mod interfaces;
pub mod math;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

use errors::ClammError;
use instructions::*;
use interfaces::{BlockClock, FlashCallback, MintCallback, SwapCallback, TokenJournal, TokenTransfer};
use math::u256::U256;
use state::{Observation, PoolConfig, PoolState, PositionInfo, TickInfo};
use storage::{PoolStore, Storage, Transaction};

/// One pool bound to its collaborators
pub struct Pool<'a> {
    storage: &'a mut dyn Storage,
    pool_id: Pubkey,
    clock: &'a dyn BlockClock,
    tokens: &'a mut dyn TokenTransfer,
}

impl<'a> Pool<'a> {
    /// Create a new pool from its configuration
    /// Fails if a pool with the same id already exists
    pub fn create(
        storage: &'a mut dyn Storage,
        clock: &'a dyn BlockClock,
        tokens: &'a mut dyn TokenTransfer,
        config: &PoolConfig,
    ) -> Result<Self> {
        let mut pool = Pool {
            storage,
            pool_id: config.pool_id,
            clock,
            tokens,
        };
        pool.run(|ctx| instructions::create_pool::handler(ctx, config))?;
        Ok(pool)
    }

    /// Bind to an existing pool
    pub fn open(
        storage: &'a mut dyn Storage,
        clock: &'a dyn BlockClock,
        tokens: &'a mut dyn TokenTransfer,
        pool_id: Pubkey,
    ) -> Result<Self> {
        require!(
            PoolStore::new(&mut *storage, pool_id).has_config(),
            ClammError::PoolNotFound
        );
        Ok(Pool {
            storage,
            pool_id,
            clock,
            tokens,
        })
    }

    pub fn pool_id(&self) -> Pubkey {
        self.pool_id
    }

    /// Token ledger the pool settles against
    pub fn tokens(&self) -> &dyn TokenTransfer {
        &*self.tokens
    }

    /// Run a handler against staged storage and token transfers, committing only on success
    fn run<T>(&mut self, f: impl FnOnce(&mut PoolContext) -> Result<T>) -> Result<T> {
        let mut tx = Transaction::begin(&mut *self.storage);
        let mut journal = TokenJournal::begin(&mut *self.tokens);
        let result = {
            let mut ctx = PoolContext {
                store: PoolStore::new(&mut tx, self.pool_id),
                clock: self.clock,
                tokens: &mut journal,
            };
            f(&mut ctx)?
        };
        journal.commit()?;
        tx.commit();
        Ok(result)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the initial price of the pool
    ///
    /// # Arguments
    /// * `sqrt_price_x96` - Initial sqrt(price) in Q64.96 format
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<()> {
        self.run(|ctx| instructions::initialize_pool::handler(ctx, sqrt_price_x96))
    }

    /// Grow the oracle buffer; returns the (old, new) target cardinality
    pub fn increase_observation_cardinality_next(&mut self, cardinality_next: u16) -> Result<(u16, u16)> {
        self.run(|ctx| instructions::increase_observation_cardinality::handler(ctx, cardinality_next))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSITION INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add liquidity to a position, paid for through the callback
    pub fn mint(&mut self, params: &MintParams, callback: &mut dyn MintCallback) -> Result<MintResult> {
        self.run(|ctx| instructions::increase_liquidity::handler(ctx, params, callback))
    }

    /// Remove liquidity from a position; the tokens become collectable
    pub fn burn(&mut self, params: &BurnParams) -> Result<BurnResult> {
        self.run(|ctx| instructions::decrease_liquidity::handler(ctx, params))
    }

    /// Withdraw owed tokens from a position
    pub fn collect(&mut self, params: &CollectParams) -> Result<CollectResult> {
        self.run(|ctx| instructions::collect_fees::handler(ctx, params))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAP INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute a swap on the pool
    pub fn swap(&mut self, params: &SwapParams, callback: &mut dyn SwapCallback) -> Result<SwapResult> {
        self.run(|ctx| instructions::swap::handler(ctx, params, callback))
    }

    /// Lend both tokens for the duration of the callback
    pub fn flash(&mut self, params: &FlashParams, callback: &mut dyn FlashCallback) -> Result<FlashResult> {
        self.run(|ctx| instructions::flash::handler(ctx, params, callback))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PROTOCOL ADMIN INSTRUCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the protocol's share of swap fees
    /// Only the protocol authority can call this
    ///
    /// # Arguments
    /// * `fee_protocol_0` - Denominator for token 0 (0 or 4..=10)
    /// * `fee_protocol_1` - Denominator for token 1 (0 or 4..=10)
    pub fn set_fee_protocol(&mut self, caller: &Pubkey, fee_protocol_0: u8, fee_protocol_1: u8) -> Result<()> {
        self.run(|ctx| instructions::set_fee_protocol::handler(ctx, caller, fee_protocol_0, fee_protocol_1))
    }

    /// Collect accumulated protocol fees
    /// Only the protocol authority can call this
    pub fn collect_protocol(&mut self, params: &CollectProtocolParams) -> Result<CollectResult> {
        self.run(|ctx| instructions::collect_protocol_fees::handler(ctx, params))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ORACLE QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Cumulatives as of each of `seconds_agos` seconds ago
    pub fn observe(&mut self, seconds_agos: &[u32]) -> Result<Vec<(i64, U256)>> {
        self.run(|ctx| instructions::observe::handler(ctx, seconds_agos))
    }

    /// Accumulators for the time the price spent inside a range
    pub fn snapshot_cumulatives_inside(&mut self, tick_lower: i32, tick_upper: i32) -> Result<CumulativesInside> {
        self.run(|ctx| instructions::observe::snapshot_cumulatives_inside(ctx, tick_lower, tick_upper))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    fn store(&mut self) -> PoolStore<'_> {
        PoolStore::new(&mut *self.storage, self.pool_id)
    }

    pub fn config(&mut self) -> Result<PoolConfig> {
        self.store().config()
    }

    pub fn state(&mut self) -> Result<PoolState> {
        self.store().state()
    }

    pub fn tick(&mut self, tick: i32) -> Result<TickInfo> {
        self.store().tick(tick)
    }

    pub fn bitmap_word(&mut self, word_pos: i16) -> Result<U256> {
        self.store().bitmap_word(word_pos)
    }

    pub fn position(&mut self, owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> Result<PositionInfo> {
        state::position::get(&self.store(), owner, tick_lower, tick_upper)
    }

    pub fn observation(&mut self, index: u16) -> Result<Observation> {
        self.store().observation(index)
    }
}
