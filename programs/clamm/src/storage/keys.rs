//! Storage key composition
//!
//! Every key is a flat concatenation of length-prefixed components:
//! `[pool id] [tag] [fixed-width big-endian component]`.

use crate::constants::tags;
use anchor_lang::prelude::*;

/// Concatenate components, each prefixed by its length as one byte
pub fn compose(components: &[&[u8]]) -> Vec<u8> {
    let len = components.iter().map(|c| 1 + c.len()).sum();
    let mut key = Vec::with_capacity(len);
    for component in components {
        debug_assert!(component.len() <= u8::MAX as usize);
        key.push(component.len() as u8);
        key.extend_from_slice(component);
    }
    key
}

pub fn config_key(pool_id: &Pubkey) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::CONFIG])
}

pub fn state_key(pool_id: &Pubkey) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::STATE])
}

pub fn tick_key(pool_id: &Pubkey, tick: i32) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::TICK, &tick.to_be_bytes()])
}

pub fn bitmap_key(pool_id: &Pubkey, word_pos: i16) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::BITMAP, &word_pos.to_be_bytes()])
}

pub fn position_key(pool_id: &Pubkey, position: &[u8; 32]) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::POSITION, position])
}

pub fn observation_key(pool_id: &Pubkey, index: u16) -> Vec<u8> {
    compose(&[pool_id.as_ref(), tags::OBSERVATION, &index.to_be_bytes()])
}
