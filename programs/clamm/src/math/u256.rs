//! Wide unsigned integers
//!
//! `U256` carries Q64.96 sqrt prices and X128 accumulators. `U512` is only
//! used as the exact intermediate product in `full_math`.

use crate::errors::ClammError;
use anchor_lang::prelude::*;
use std::io::{Read, Write};

#[allow(clippy::assign_op_pattern, clippy::manual_div_ceil, clippy::ptr_offset_with_cast)]
mod construct {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer.
        pub struct U256(4);
    }

    construct_uint! {
        /// 512-bit unsigned integer.
        pub struct U512(8);
    }
}

pub use construct::{U256, U512};

impl U256 {
    /// Widen into a 512-bit value without loss.
    pub fn widen(self) -> U512 {
        let [a, b, c, d] = self.0;
        U512([a, b, c, d, 0, 0, 0, 0])
    }

    /// Narrow a 512-bit value, `None` if any of the high limbs are set.
    pub fn narrow(x: U512) -> Option<U256> {
        let limbs = x.0;
        if limbs[4..].iter().any(|limb| *limb != 0) {
            return None;
        }
        Some(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
    }

    /// Checked conversion into a token amount.
    pub fn try_into_u128(self) -> Result<u128> {
        if self.0[2] != 0 || self.0[3] != 0 {
            return Err(ClammError::CastOverflow.into());
        }
        Ok(self.low_u128())
    }

    /// Whether the value fits in 160 bits, the width of a sqrt price.
    pub fn fits_u160(&self) -> bool {
        self.0[3] == 0 && self.0[2] >> 32 == 0
    }
}

impl AnchorSerialize for U256 {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for limb in self.0.iter() {
            writer.write_all(&limb.to_le_bytes())?;
        }
        Ok(())
    }
}

impl AnchorDeserialize for U256 {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut limbs = [0u64; 4];
        for limb in limbs.iter_mut() {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            *limb = u64::from_le_bytes(buf);
        }
        Ok(U256(limbs))
    }
}
