//! Front variant-bitmap shared by a struct's enum-typed fields (§4.2).
//!
//! Bits are assigned to fields in declaration order, least-significant bit
//! first, packed into `ceil(total_bits / 8)` bytes stored little-endian
//! (byte 0 holds bits 0..8, byte 1 holds bits 8..16, ...).

use crate::error::{AngstromError, Result};
use crate::reader::Reader;

pub struct VariantBitmap {
    bytes: Vec<u8>,
    cursor: usize,
}

impl VariantBitmap {
    pub fn read(reader: &mut Reader, total_bits: usize) -> Result<Self> {
        let nbytes = total_bits.div_ceil(8);
        let mut bytes = Vec::with_capacity(nbytes);
        for _ in 0..nbytes {
            bytes.push(reader.read_u8()?);
        }
        Ok(Self { bytes, cursor: 0 })
    }

    /// Consume the next single bit (a `bool` field, an `Option` presence
    /// flag, or a two-variant enum's selector).
    pub fn next_bit(&mut self) -> Result<bool> {
        let byte_idx = self.cursor / 8;
        let bit_idx = self.cursor % 8;
        let byte = *self
            .bytes
            .get(byte_idx)
            .ok_or(AngstromError::ReadOutOfBounds)?;
        self.cursor += 1;
        Ok((byte >> bit_idx) & 1 != 0)
    }
}
