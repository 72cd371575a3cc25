//! In-memory collaborators and end-to-end pool scenarios

use crate::constants::MIN_SQRT_RATIO;
use crate::errors::{error_code, ClammError};
use crate::interfaces::{BlockClock, FlashCallback, MintCallback, SwapCallback, TokenTransfer};
use crate::math::full_math::{Q128, Q96};
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::math::u256::U256;
use crate::state::{FeeTier, PoolConfig};
use crate::storage::MemoryStorage;
use crate::*;
use anchor_lang::prelude::*;
use std::cell::Cell;
use std::collections::BTreeMap;

/// Token ledger keyed by (token, account)
#[derive(Debug, Clone, Default)]
pub struct MemoryTokens {
    balances: BTreeMap<(Pubkey, Pubkey), u128>,
}

impl MemoryTokens {
    pub fn mint_to(&mut self, token: &Pubkey, account: &Pubkey, amount: u128) {
        *self.balances.entry((*token, *account)).or_default() += amount;
    }
}

impl TokenTransfer for MemoryTokens {
    fn balance_of(&self, token: &Pubkey, account: &Pubkey) -> u128 {
        self.balances.get(&(*token, *account)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balance_of(token, from);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(ClammError::InsufficientBalance)?;
        self.balances.insert((*token, *from), remaining);
        self.mint_to(token, to, amount);
        Ok(())
    }
}

/// Clock the test moves by hand
pub struct FixedClock(Cell<u64>);

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self(Cell::new(now))
    }

    pub fn advance(&self, seconds: u64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl BlockClock for FixedClock {
    fn now(&self) -> u64 {
        self.0.get()
    }
}

/// Pays whatever the pool asks for from its own account
pub struct Payer {
    pub account: Pubkey,
    pub pool: Pubkey,
    pub token_0: Pubkey,
    pub token_1: Pubkey,
    /// Principal borrowed by a flash loan, repaid with the fee
    pub borrowed: (u128, u128),
}

impl Payer {
    fn pay(&self, tokens: &mut dyn TokenTransfer, amount_0: u128, amount_1: u128) -> Result<()> {
        if amount_0 > 0 {
            tokens.transfer(&self.token_0, &self.account, &self.pool, amount_0)?;
        }
        if amount_1 > 0 {
            tokens.transfer(&self.token_1, &self.account, &self.pool, amount_1)?;
        }
        Ok(())
    }
}

impl MintCallback for Payer {
    fn mint_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        amount_0_owed: u128,
        amount_1_owed: u128,
        _data: &[u8],
    ) -> Result<()> {
        self.pay(tokens, amount_0_owed, amount_1_owed)
    }
}

impl SwapCallback for Payer {
    fn swap_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        amount_0_delta: i128,
        amount_1_delta: i128,
        _data: &[u8],
    ) -> Result<()> {
        self.pay(
            tokens,
            amount_0_delta.max(0).unsigned_abs(),
            amount_1_delta.max(0).unsigned_abs(),
        )
    }
}

impl FlashCallback for Payer {
    fn flash_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        fee_0: u128,
        fee_1: u128,
        _data: &[u8],
    ) -> Result<()> {
        self.pay(tokens, self.borrowed.0 + fee_0, self.borrowed.1 + fee_1)
    }
}

/// Never pays
pub struct Freeloader;

impl MintCallback for Freeloader {
    fn mint_callback(&mut self, _: &mut dyn TokenTransfer, _: u128, _: u128, _: &[u8]) -> Result<()> {
        Ok(())
    }
}

impl SwapCallback for Freeloader {
    fn swap_callback(&mut self, _: &mut dyn TokenTransfer, _: i128, _: i128, _: &[u8]) -> Result<()> {
        Ok(())
    }
}

impl FlashCallback for Freeloader {
    fn flash_callback(&mut self, _: &mut dyn TokenTransfer, _: u128, _: u128, _: &[u8]) -> Result<()> {
        Ok(())
    }
}

pub fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: ClammError) {
    match result {
        Ok(value) => panic!("expected {:?}, got Ok({:?})", expected, value),
        Err(err) => assert_eq!(error_code(&err), Some(u32::from(expected)), "{:?}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: u64 = 1_000;
    const FUNDS: u128 = 1_000_000_000_000_000;

    struct Accounts {
        pool_id: Pubkey,
        token_0: Pubkey,
        token_1: Pubkey,
        lp: Pubkey,
        trader: Pubkey,
        authority: Pubkey,
    }

    impl Accounts {
        fn new(tokens: &mut MemoryTokens) -> Self {
            let a = Pubkey::new_unique();
            let b = Pubkey::new_unique();
            let (token_0, token_1) = if a < b { (a, b) } else { (b, a) };
            let accounts = Accounts {
                pool_id: Pubkey::new_unique(),
                token_0,
                token_1,
                lp: Pubkey::new_unique(),
                trader: Pubkey::new_unique(),
                authority: Pubkey::new_unique(),
            };
            for account in [accounts.lp, accounts.trader] {
                tokens.mint_to(&token_0, &account, FUNDS);
                tokens.mint_to(&token_1, &account, FUNDS);
            }
            accounts
        }

        fn config(&self, fee: u32, tick_spacing: i32) -> PoolConfig {
            PoolConfig::new(
                self.pool_id,
                self.token_0,
                self.token_1,
                FeeTier::new(fee, tick_spacing).unwrap(),
                self.authority,
            )
            .unwrap()
        }

        fn payer(&self, account: Pubkey) -> Payer {
            Payer {
                account,
                pool: self.pool_id,
                token_0: self.token_0,
                token_1: self.token_1,
                borrowed: (0, 0),
            }
        }

        fn mint_params(&self, tick_lower: i32, tick_upper: i32, amount: u128) -> MintParams {
            MintParams {
                recipient: self.lp,
                tick_lower,
                tick_upper,
                amount,
                amount_0_max: None,
                amount_1_max: None,
                deadline: None,
                data: Vec::new(),
            }
        }

        fn swap_params(&self, zero_for_one: bool, amount_specified: i128, limit: U256) -> SwapParams {
            SwapParams {
                recipient: self.trader,
                zero_for_one,
                amount_specified,
                sqrt_price_limit_x96: limit,
                other_amount_threshold: None,
                deadline: None,
                data: Vec::new(),
            }
        }
    }

    fn ratio(tick: i32) -> U256 {
        get_sqrt_ratio_at_tick(tick).unwrap()
    }

    /// Pool at price 1 with 0.3% fee and tick spacing 10
    fn open_pool<'a>(
        storage: &'a mut MemoryStorage,
        clock: &'a FixedClock,
        tokens: &'a mut MemoryTokens,
        accounts: &Accounts,
    ) -> Pool<'a> {
        let config = accounts.config(3000, 10);
        let mut pool = Pool::create(storage, clock, tokens, &config).unwrap();
        pool.initialize(Q96).unwrap();
        pool
    }

    #[test]
    fn test_create_and_initialize() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let config = accounts.config(3000, 10);

        {
            let mut pool = Pool::create(&mut storage, &clock, &mut tokens, &config).unwrap();
            assert_error(pool.state(), ClammError::PoolNotInitialized);

            pool.initialize(Q96).unwrap();
            assert_error(pool.initialize(Q96), ClammError::PoolAlreadyInitialized);

            let state = pool.state().unwrap();
            assert_eq!(state.tick, 0);
            assert_eq!(state.observation_cardinality, 1);
            assert_eq!(state.observation_cardinality_next, 1);
            assert_eq!(pool.observation(0).unwrap().block_timestamp, START as u32);
            assert_eq!(pool.config().unwrap(), config);
        }

        assert_error(
            Pool::create(&mut storage, &clock, &mut tokens, &config).map(|_| ()),
            ClammError::PoolAlreadyExists,
        );
        assert_error(
            Pool::open(&mut storage, &clock, &mut tokens, Pubkey::new_unique()).map(|_| ()),
            ClammError::PoolNotFound,
        );
    }

    #[test]
    fn test_initialize_rejects_price_out_of_range() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let config = accounts.config(3000, 10);

        let mut pool = Pool::create(&mut storage, &clock, &mut tokens, &config).unwrap();
        assert_error(
            pool.initialize(MIN_SQRT_RATIO - U256::one()),
            ClammError::SqrtPriceOutOfRange,
        );
    }

    #[test]
    fn test_mint_swap_at_price_one() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        let minted = pool
            .mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();
        assert_eq!(minted, MintResult { amount_0: 4988, amount_1: 4988 });
        assert_eq!(pool.state().unwrap().liquidity, 1_000_000);
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &accounts.pool_id), 4988);

        clock.advance(10);
        let swapped = pool
            .swap(
                &accounts.swap_params(true, 1_000, MIN_SQRT_RATIO + U256::one()),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();

        assert_eq!(swapped.amount_0, 1_000);
        assert_eq!(swapped.amount_1, -996);
        assert_eq!(
            swapped.sqrt_price_x96,
            U256::from_dec_str("79149250711305166342700278159").unwrap()
        );
        assert_eq!(swapped.tick, -20);

        // 997 in, 3 fee: ceil(997 * 3000 / 997000)
        let state = pool.state().unwrap();
        assert_eq!(
            state.fee_growth_global_0_x128,
            U256::from(3u64) * Q128 / U256::from(1_000_000u64)
        );
        assert_eq!(state.fee_growth_global_1_x128, U256::zero());

        let lower = pool.tick(-100).unwrap();
        let upper = pool.tick(100).unwrap();
        assert_eq!(lower.liquidity_net, 1_000_000);
        assert_eq!(upper.liquidity_net, -1_000_000);
        assert_eq!(lower.liquidity_gross, upper.liquidity_gross);

        assert_eq!(pool.tokens().balance_of(&accounts.token_1, &accounts.trader), FUNDS + 996);
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &accounts.trader), FUNDS - 1_000);
    }

    #[test]
    fn test_failed_mint_leaves_storage_untouched() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        open_pool(&mut storage, &clock, &mut tokens, &accounts);
        let before = storage.clone();

        let mut pool = Pool::open(&mut storage, &clock, &mut tokens, accounts.pool_id).unwrap();
        assert_error(
            pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut Freeloader),
            ClammError::InsufficientPayment0,
        );
        drop(pool);

        assert_eq!(storage, before);
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);

        let mut config = accounts.config(3000, 10);
        config.tick_spacing = 0;
        assert_error(
            Pool::create(&mut storage, &clock, &mut tokens, &config).map(|_| ()),
            ClammError::InvalidTickSpacing,
        );

        let mut config = accounts.config(3000, 10);
        config.fee = 2_000_000;
        assert_error(
            Pool::create(&mut storage, &clock, &mut tokens, &config).map(|_| ()),
            ClammError::FeeRateTooHigh,
        );

        let mut config = accounts.config(3000, 10);
        config.max_liquidity_per_tick = u128::MAX;
        assert_error(
            Pool::create(&mut storage, &clock, &mut tokens, &config).map(|_| ()),
            ClammError::InvalidTickSpacing,
        );

        let mut config = accounts.config(3000, 10);
        std::mem::swap(&mut config.token_0, &mut config.token_1);
        assert_error(
            Pool::create(&mut storage, &clock, &mut tokens, &config).map(|_| ()),
            ClammError::InvalidTokenOrder,
        );

        assert_eq!(storage, MemoryStorage::new());
    }

    #[test]
    fn test_collect_unknown_position_writes_nothing() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        open_pool(&mut storage, &clock, &mut tokens, &accounts);
        let before = storage.clone();

        let mut pool = Pool::open(&mut storage, &clock, &mut tokens, accounts.pool_id).unwrap();
        let collected = pool
            .collect(&CollectParams {
                owner: Pubkey::new_unique(),
                recipient: accounts.trader,
                tick_lower: -100,
                tick_upper: 100,
                amount_0_requested: u128::MAX,
                amount_1_requested: u128::MAX,
                deadline: None,
            })
            .unwrap();
        assert_eq!(collected, CollectResult { amount_0: 0, amount_1: 0 });
        drop(pool);

        assert_eq!(storage, before);
    }

    #[test]
    fn test_mint_validation() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);
        let mut payer = accounts.payer(accounts.lp);

        assert_error(
            pool.mint(&accounts.mint_params(-100, 100, 0), &mut payer),
            ClammError::ZeroMintAmount,
        );
        assert_error(
            pool.mint(&accounts.mint_params(-105, 100, 1_000), &mut payer),
            ClammError::TickNotAligned,
        );
        assert_error(
            pool.mint(&accounts.mint_params(100, -100, 1_000), &mut payer),
            ClammError::InvalidTickRange,
        );

        let mut params = accounts.mint_params(-100, 100, 1_000_000);
        params.amount_0_max = Some(4987);
        assert_error(pool.mint(&params, &mut payer), ClammError::Amount0ExceedsMax);

        let mut params = accounts.mint_params(-100, 100, 1_000_000);
        params.deadline = Some(START - 1);
        assert_error(pool.mint(&params, &mut payer), ClammError::DeadlineExceeded);

        params.deadline = Some(START);
        assert!(pool.mint(&params, &mut payer).is_ok());
    }

    #[test]
    fn test_mint_outside_range_takes_one_token() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);
        let mut payer = accounts.payer(accounts.lp);

        let above = pool.mint(&accounts.mint_params(10, 100, 1_000_000), &mut payer).unwrap();
        assert!(above.amount_0 > 0);
        assert_eq!(above.amount_1, 0);

        let below = pool.mint(&accounts.mint_params(-100, -10, 1_000_000), &mut payer).unwrap();
        assert_eq!(below.amount_0, 0);
        assert!(below.amount_1 > 0);

        // Neither range contains the current tick
        assert_eq!(pool.state().unwrap().liquidity, 0);
    }

    #[test]
    fn test_burn_and_collect() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        let burn = BurnParams {
            owner: accounts.lp,
            tick_lower: -100,
            tick_upper: 100,
            amount: 1_000_000,
            amount_0_min: Some(4987),
            amount_1_min: Some(4987),
            deadline: None,
        };
        let burned = pool.burn(&burn).unwrap();
        assert_eq!(burned, BurnResult { amount_0: 4987, amount_1: 4987 });

        let position = pool.position(&accounts.lp, -100, 100).unwrap();
        assert_eq!(position.liquidity, 0);
        assert_eq!(position.tokens_owed_0, 4987);
        assert_eq!(position.tokens_owed_1, 4987);

        // Last liquidity out clears both ticks and their bitmap bits
        assert!(!pool.tick(-100).unwrap().initialized);
        assert!(!pool.tick(100).unwrap().initialized);
        assert_eq!(pool.bitmap_word(-1).unwrap(), U256::zero());
        assert_eq!(pool.bitmap_word(0).unwrap(), U256::zero());
        assert_eq!(pool.state().unwrap().liquidity, 0);

        // Nothing left to remove
        assert_error(pool.burn(&burn), ClammError::LiquidityUnderflow);

        let recipient = Pubkey::new_unique();
        let collected = pool
            .collect(&CollectParams {
                owner: accounts.lp,
                recipient,
                tick_lower: -100,
                tick_upper: 100,
                amount_0_requested: 1_000,
                amount_1_requested: u128::MAX,
                deadline: None,
            })
            .unwrap();
        assert_eq!(collected, CollectResult { amount_0: 1_000, amount_1: 4987 });
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &recipient), 1_000);

        let position = pool.position(&accounts.lp, -100, 100).unwrap();
        assert_eq!(position.tokens_owed_0, 3987);
        assert_eq!(position.tokens_owed_1, 0);
    }

    #[test]
    fn test_burn_zero_settles_fees() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();
        pool.swap(
            &accounts.swap_params(true, 1_000, MIN_SQRT_RATIO + U256::one()),
            &mut accounts.payer(accounts.trader),
        )
        .unwrap();

        let poke = BurnParams {
            owner: accounts.lp,
            tick_lower: -100,
            tick_upper: 100,
            amount: 0,
            amount_0_min: None,
            amount_1_min: None,
            deadline: None,
        };
        assert_eq!(pool.burn(&poke).unwrap(), BurnResult { amount_0: 0, amount_1: 0 });

        // 3 units of fee on 1e6 liquidity, rounded down through the X128 accumulator
        let position = pool.position(&accounts.lp, -100, 100).unwrap();
        assert_eq!(position.tokens_owed_0, 2);
        assert_eq!(position.tokens_owed_1, 0);

        // Poking an empty position is rejected
        let stranger = BurnParams { owner: Pubkey::new_unique(), ..poke };
        assert_error(pool.burn(&stranger), ClammError::NoPositionLiquidity);
    }

    #[test]
    fn test_swap_crosses_tick_and_exhausts_liquidity() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        let swapped = pool
            .swap(
                &accounts.swap_params(true, 10_000, ratio(-200)),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();

        // 5013 in plus 16 fee to reach tick -100, then no liquidity down to the limit
        assert_eq!(swapped.amount_0, 5029);
        assert_eq!(swapped.amount_1, -4987);
        assert_eq!(swapped.sqrt_price_x96, ratio(-200));
        assert_eq!(swapped.tick, -200);
        assert_eq!(swapped.liquidity, 0);

        let lower = pool.tick(-100).unwrap();
        let state = pool.state().unwrap();
        assert_eq!(
            state.fee_growth_global_0_x128,
            U256::from(16u64) * Q128 / U256::from(1_000_000u64)
        );
        // Crossing flipped the outside frame to the growth accrued so far
        assert_eq!(lower.fee_growth_outside_0_x128, state.fee_growth_global_0_x128);

        // Back up through the tick restores the in-range liquidity
        let back = pool
            .swap(
                &accounts.swap_params(false, 1_000, ratio(50)),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();
        assert!(back.amount_1 > 0);
        assert!(back.amount_0 < 0);
        assert_eq!(back.liquidity, 1_000_000);
        assert!(back.tick >= -100);
    }

    #[test]
    fn test_swap_validation() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);
        let mut trader = accounts.payer(accounts.trader);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        assert_error(
            pool.swap(&accounts.swap_params(true, 0, ratio(-50)), &mut trader),
            ClammError::ZeroSwapAmount,
        );
        assert_error(
            pool.swap(&accounts.swap_params(true, 1_000, ratio(50)), &mut trader),
            ClammError::InvalidSqrtPriceLimit,
        );
        assert_error(
            pool.swap(&accounts.swap_params(true, 1_000, MIN_SQRT_RATIO), &mut trader),
            ClammError::InvalidSqrtPriceLimit,
        );
        assert_error(
            pool.swap(&accounts.swap_params(false, 1_000, ratio(-50)), &mut trader),
            ClammError::InvalidSqrtPriceLimit,
        );

        let mut params = accounts.swap_params(true, 1_000, ratio(-50));
        params.other_amount_threshold = Some(997);
        assert_error(pool.swap(&params, &mut trader), ClammError::OutputBelowMinimum);

        let mut params = accounts.swap_params(true, -100, ratio(-50));
        params.other_amount_threshold = Some(50);
        assert_error(pool.swap(&params, &mut trader), ClammError::InputExceedsMaximum);

        let pool_before = pool.tokens().balance_of(&accounts.token_1, &accounts.pool_id);
        let trader_before = pool.tokens().balance_of(&accounts.token_1, &accounts.trader);
        assert_error(
            pool.swap(&accounts.swap_params(true, 1_000, ratio(-50)), &mut Freeloader),
            ClammError::InsufficientInputAmount,
        );
        assert_eq!(pool.state().unwrap().sqrt_price_x96, Q96);
        // The output sent ahead of payment is rolled back with the swap
        assert_eq!(pool_before, 4988);
        assert_eq!(pool.tokens().balance_of(&accounts.token_1, &accounts.pool_id), pool_before);
        assert_eq!(pool.tokens().balance_of(&accounts.token_1, &accounts.trader), trader_before);
    }

    #[test]
    fn test_exact_output_swap() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        let swapped = pool
            .swap(
                &accounts.swap_params(false, -100, ratio(100)),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();
        assert_eq!(swapped.amount_0, -100);
        assert!(swapped.amount_1 > 100);
        assert!(swapped.sqrt_price_x96 > Q96);
    }

    #[test]
    fn test_protocol_fees() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        assert_error(
            pool.set_fee_protocol(&accounts.lp, 4, 4),
            ClammError::Unauthorized,
        );
        assert_error(
            pool.set_fee_protocol(&accounts.authority, 3, 0),
            ClammError::InvalidFeeProtocol,
        );
        pool.set_fee_protocol(&accounts.authority, 4, 10).unwrap();
        let state = pool.state().unwrap();
        assert_eq!(state.fee_protocol_0(), 4);
        assert_eq!(state.fee_protocol_1(), 10);

        let minted = pool
            .mint(
                &accounts.mint_params(-100, 100, 1_000_000_000_000),
                &mut accounts.payer(accounts.lp),
            )
            .unwrap();
        assert_eq!(minted.amount_0, 4_987_272_071);

        let swapped = pool
            .swap(
                &accounts.swap_params(true, 1_000_000, MIN_SQRT_RATIO + U256::one()),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();
        assert_eq!(swapped.amount_1, -996_999);

        // Fee of 3000, a quarter to the protocol
        let state = pool.state().unwrap();
        assert_eq!(state.protocol_fees_0, 750);
        assert_eq!(
            state.fee_growth_global_0_x128,
            U256::from(2250u64) * Q128 / U256::from(1_000_000_000_000u64)
        );

        let params = CollectProtocolParams {
            caller: accounts.authority,
            recipient: accounts.authority,
            amount_0_requested: u128::MAX,
            amount_1_requested: u128::MAX,
        };
        assert_error(
            pool.collect_protocol(&CollectProtocolParams { caller: accounts.lp, ..params }),
            ClammError::Unauthorized,
        );
        let collected = pool.collect_protocol(&params).unwrap();
        assert_eq!(collected, CollectResult { amount_0: 750, amount_1: 0 });
        assert_eq!(pool.state().unwrap().protocol_fees_0, 0);
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &accounts.authority), 750);
    }

    #[test]
    fn test_flash() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        let params = FlashParams {
            recipient: accounts.trader,
            amount_0: 1_000,
            amount_1: 0,
            data: Vec::new(),
        };
        assert_error(
            pool.flash(&params, &mut accounts.payer(accounts.trader)),
            ClammError::ZeroLiquidity,
        );

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        let mut borrower = accounts.payer(accounts.trader);
        borrower.borrowed = (1_000, 0);
        let result = pool.flash(&params, &mut borrower).unwrap();
        assert_eq!(result, FlashResult { paid_0: 3, paid_1: 0 });
        assert_eq!(
            pool.state().unwrap().fee_growth_global_0_x128,
            U256::from(3u64) * Q128 / U256::from(1_000_000u64)
        );

        let pool_before = pool.tokens().balance_of(&accounts.token_0, &accounts.pool_id);
        let trader_before = pool.tokens().balance_of(&accounts.token_0, &accounts.trader);
        assert_error(pool.flash(&params, &mut Freeloader), ClammError::FlashNotRepaid0);
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &accounts.pool_id), pool_before);
        assert_eq!(pool.tokens().balance_of(&accounts.token_0, &accounts.trader), trader_before);
    }

    #[test]
    fn test_oracle_through_pool() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        clock.advance(10);
        pool.swap(
            &accounts.swap_params(true, 1_000, MIN_SQRT_RATIO + U256::one()),
            &mut accounts.payer(accounts.trader),
        )
        .unwrap();
        clock.advance(10);

        let observed = pool.observe(&[0, 10]).unwrap();
        assert_eq!(observed[0].0, -200);
        assert_eq!(observed[1].0, 0);
        assert!(observed[0].1 > observed[1].1);

        // A single slot only remembers the last write
        assert_error(pool.observe(&[20]), ClammError::OracleObservationStale);

        let inside = pool.snapshot_cumulatives_inside(-100, 100).unwrap();
        assert_eq!(inside.seconds_inside, 20);
        assert_eq!(inside.tick_cumulative_inside, -200);
        assert_error(
            pool.snapshot_cumulatives_inside(-200, 100),
            ClammError::TickNotInitialized,
        );
    }

    #[test]
    fn test_increase_observation_cardinality() {
        let mut storage = MemoryStorage::new();
        let clock = FixedClock::new(START);
        let mut tokens = MemoryTokens::default();
        let accounts = Accounts::new(&mut tokens);
        let mut pool = open_pool(&mut storage, &clock, &mut tokens, &accounts);

        assert_eq!(pool.increase_observation_cardinality_next(4).unwrap(), (1, 4));
        assert_eq!(pool.increase_observation_cardinality_next(2).unwrap(), (4, 4));
        assert_eq!(pool.observation(3).unwrap().block_timestamp, 1);
        assert!(!pool.observation(3).unwrap().initialized);

        pool.mint(&accounts.mint_params(-100, 100, 1_000_000), &mut accounts.payer(accounts.lp))
            .unwrap();

        // Each block with a tick change fills the next slot
        for _ in 0..3 {
            clock.advance(10);
            pool.swap(
                &accounts.swap_params(true, 100, MIN_SQRT_RATIO + U256::one()),
                &mut accounts.payer(accounts.trader),
            )
            .unwrap();
        }
        let state = pool.state().unwrap();
        assert_eq!(state.observation_cardinality, 4);
        assert_eq!(state.observation_index, 3);
        assert!(pool.observe(&[30]).is_ok());
    }
}
