//! Typed per-pool view over a byte-keyed storage

use crate::errors::ClammError;
use crate::math::u256::U256;
use crate::state::{Observation, PoolConfig, PoolState, PositionInfo, TickInfo};
use crate::storage::keys;
use crate::storage::Storage;
use anchor_lang::prelude::*;

/// Records of one pool, encoded with borsh
pub struct PoolStore<'a> {
    storage: &'a mut dyn Storage,
    pool_id: Pubkey,
}

impl<'a> PoolStore<'a> {
    pub fn new(storage: &'a mut dyn Storage, pool_id: Pubkey) -> Self {
        Self { storage, pool_id }
    }

    pub fn pool_id(&self) -> Pubkey {
        self.pool_id
    }

    fn load<T: AnchorDeserialize>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.storage.get(key) {
            Some(bytes) => T::try_from_slice(&bytes)
                .map(Some)
                .map_err(|_| ClammError::CorruptRecord.into()),
            None => Ok(None),
        }
    }

    fn save<T: AnchorSerialize>(&mut self, key: &[u8], record: &T) -> Result<()> {
        let mut bytes = Vec::new();
        record
            .serialize(&mut bytes)
            .map_err(|_| ClammError::CorruptRecord)?;
        self.storage.set(key, bytes);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // POOL
    // ═══════════════════════════════════════════════════════════════════════

    pub fn has_config(&self) -> bool {
        self.storage.get(&keys::config_key(&self.pool_id)).is_some()
    }

    pub fn config(&self) -> Result<PoolConfig> {
        self.load(&keys::config_key(&self.pool_id))?
            .ok_or(ClammError::PoolNotFound.into())
    }

    pub fn set_config(&mut self, config: &PoolConfig) -> Result<()> {
        self.save(&keys::config_key(&self.pool_id), config)
    }

    /// Pool state, or `None` before initialization
    pub fn try_state(&self) -> Result<Option<PoolState>> {
        self.load(&keys::state_key(&self.pool_id))
    }

    pub fn state(&self) -> Result<PoolState> {
        self.try_state()?
            .ok_or(ClammError::PoolNotInitialized.into())
    }

    pub fn set_state(&mut self, state: &PoolState) -> Result<()> {
        self.save(&keys::state_key(&self.pool_id), state)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TICKS
    // ═══════════════════════════════════════════════════════════════════════

    /// Tick record, zero-valued when absent
    pub fn tick(&self, tick: i32) -> Result<TickInfo> {
        Ok(self
            .load(&keys::tick_key(&self.pool_id, tick))?
            .unwrap_or_default())
    }

    pub fn set_tick(&mut self, tick: i32, info: &TickInfo) -> Result<()> {
        self.save(&keys::tick_key(&self.pool_id, tick), info)
    }

    pub fn delete_tick(&mut self, tick: i32) {
        self.storage.delete(&keys::tick_key(&self.pool_id, tick));
    }

    /// Bitmap word, zero when absent
    pub fn bitmap_word(&self, word_pos: i16) -> Result<U256> {
        Ok(self
            .load(&keys::bitmap_key(&self.pool_id, word_pos))?
            .unwrap_or_default())
    }

    /// Store a bitmap word; empty words are removed
    pub fn set_bitmap_word(&mut self, word_pos: i16, word: U256) -> Result<()> {
        let key = keys::bitmap_key(&self.pool_id, word_pos);
        if word.is_zero() {
            self.storage.delete(&key);
            Ok(())
        } else {
            self.save(&key, &word)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // POSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Position record by hashed key, zero-valued when absent
    pub fn position(&self, key: &[u8; 32]) -> Result<PositionInfo> {
        Ok(self
            .load(&keys::position_key(&self.pool_id, key))?
            .unwrap_or_default())
    }

    pub fn set_position(&mut self, key: &[u8; 32], info: &PositionInfo) -> Result<()> {
        self.save(&keys::position_key(&self.pool_id, key), info)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OBSERVATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Observation slot, zero-valued (uninitialized) when absent
    pub fn observation(&self, index: u16) -> Result<Observation> {
        Ok(self
            .load(&keys::observation_key(&self.pool_id, index))?
            .unwrap_or_default())
    }

    pub fn set_observation(&mut self, index: u16, observation: &Observation) -> Result<()> {
        self.save(&keys::observation_key(&self.pool_id, index), observation)
    }
}
