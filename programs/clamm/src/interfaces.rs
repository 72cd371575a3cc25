//! Collaborator interfaces
//!
//! Capabilities the pool consumes from its host: a block clock, a token
//! ledger, and callbacks through which whoever initiates a liquidity
//! action or swap pays the pool.

use crate::errors::ClammError;
use anchor_lang::prelude::*;
use std::collections::BTreeMap;

/// Deterministic, monotonically non-decreasing block time
pub trait BlockClock {
    /// Current block time in seconds
    fn now(&self) -> u64;

    /// Block time truncated to the 32-bit timestamps the oracle stores
    fn timestamp(&self) -> u32 {
        self.now() as u32
    }
}

/// Synchronous token ledger; a transfer either completes or fails
pub trait TokenTransfer {
    /// Balance of `account` in `token`
    fn balance_of(&self, token: &Pubkey, account: &Pubkey) -> u128;

    /// Move `amount` of `token` from one account to another
    fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()>;
}

/// Transfers staged over another ledger
///
/// Balances seen through the journal include every staged transfer. Nothing
/// reaches the inner ledger until `commit`; dropping the journal discards
/// every staged transfer.
pub struct TokenJournal<'a> {
    inner: &'a mut dyn TokenTransfer,
    credits: BTreeMap<(Pubkey, Pubkey), u128>,
    debits: BTreeMap<(Pubkey, Pubkey), u128>,
    transfers: Vec<(Pubkey, Pubkey, Pubkey, u128)>,
}

impl<'a> TokenJournal<'a> {
    pub fn begin(inner: &'a mut dyn TokenTransfer) -> Self {
        Self {
            inner,
            credits: BTreeMap::new(),
            debits: BTreeMap::new(),
            transfers: Vec::new(),
        }
    }

    /// Number of staged transfers
    pub fn pending(&self) -> usize {
        self.transfers.len()
    }

    /// Replay every staged transfer on the inner ledger, in order
    pub fn commit(self) -> Result<()> {
        for (token, from, to, amount) in self.transfers {
            self.inner.transfer(&token, &from, &to, amount)?;
        }
        Ok(())
    }
}

impl TokenTransfer for TokenJournal<'_> {
    fn balance_of(&self, token: &Pubkey, account: &Pubkey) -> u128 {
        let key = (*token, *account);
        let credit = self.credits.get(&key).copied().unwrap_or(0);
        let debit = self.debits.get(&key).copied().unwrap_or(0);
        // Staged debits never exceed the balance they were checked against
        self.inner
            .balance_of(token, account)
            .saturating_add(credit)
            .saturating_sub(debit)
    }

    fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        require!(
            self.balance_of(token, from) >= amount,
            ClammError::InsufficientBalance
        );

        let debit = self.debits.entry((*token, *from)).or_default();
        *debit = debit.checked_add(amount).ok_or(ClammError::MathOverflow)?;
        let credit = self.credits.entry((*token, *to)).or_default();
        *credit = credit.checked_add(amount).ok_or(ClammError::MathOverflow)?;

        self.transfers.push((*token, *from, *to, amount));
        Ok(())
    }
}

/// Called during mint to pay the tokens owed for the new liquidity
pub trait MintCallback {
    fn mint_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        amount_0_owed: u128,
        amount_1_owed: u128,
        data: &[u8],
    ) -> Result<()>;
}

/// Called during swap to pay the input token
///
/// Deltas are from the pool's point of view: positive amounts are owed to
/// the pool, negative amounts were already sent to the recipient.
pub trait SwapCallback {
    fn swap_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        amount_0_delta: i128,
        amount_1_delta: i128,
        data: &[u8],
    ) -> Result<()>;
}

/// Called during flash to repay the loan plus fees
pub trait FlashCallback {
    fn flash_callback(
        &mut self,
        tokens: &mut dyn TokenTransfer,
        fee_0: u128,
        fee_1: u128,
        data: &[u8],
    ) -> Result<()>;
}
