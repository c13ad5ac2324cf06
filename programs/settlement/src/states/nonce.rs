//! Per-signer nonce bitmap (§3 "Nonces", §6 `invalidate-nonce`, I7, R3):
//! 256 nonces per word, word selected by `nonce >> 8`, bit by `nonce & 0xff`.

use alloy_primitives::Address;

use crate::error::{AngstromError, Result};

#[derive(Debug, Clone, Default)]
pub struct NonceBitmaps {
    words: ahash::AHashMap<(Address, u64), u128>,
}

impl NonceBitmaps {
    pub fn new() -> Self {
        Self { words: ahash::AHashMap::new() }
    }

    fn word_index(nonce: u64) -> (u64, u32) {
        (nonce >> 8, (nonce & 0xff) as u32)
    }

    pub fn is_set(&self, signer: Address, nonce: u64) -> bool {
        let (word_idx, bit) = Self::word_index(nonce);
        match self.words.get(&(signer, word_idx)) {
            Some(word) => word & (1u128 << bit) != 0,
            None => false,
        }
    }

    /// Marks the nonce used, failing if it already was (`NonceReuse`, I7).
    /// The core must call this before any settlement mutation for the
    /// order.
    pub fn use_nonce(&mut self, signer: Address, nonce: u64) -> Result<()> {
        let (word_idx, bit) = Self::word_index(nonce);
        let word = self.words.entry((signer, word_idx)).or_insert(0);
        if *word & (1u128 << bit) != 0 {
            return Err(AngstromError::NonceReuse);
        }
        *word |= 1u128 << bit;
        Ok(())
    }

    /// `invalidate-nonce` (§6): a signer cancelling one of their own
    /// standing orders ahead of time.
    pub fn invalidate(&mut self, signer: Address, nonce: u64) -> Result<()> {
        self.use_nonce(signer, nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn fresh_nonce_succeeds_then_reuse_fails() {
        let mut nonces = NonceBitmaps::new();
        let signer = addr(1);
        nonces.use_nonce(signer, 7).unwrap();
        assert_eq!(nonces.use_nonce(signer, 7), Err(AngstromError::NonceReuse));
    }

    #[test]
    fn different_signers_are_independent() {
        let mut nonces = NonceBitmaps::new();
        nonces.use_nonce(addr(1), 5).unwrap();
        assert!(!nonces.is_set(addr(2), 5));
    }

    #[test]
    fn invalidate_then_order_with_same_nonce_fails() {
        let mut nonces = NonceBitmaps::new();
        let signer = addr(9);
        nonces.invalidate(signer, 42).unwrap();
        assert_eq!(nonces.use_nonce(signer, 42), Err(AngstromError::NonceReuse));
    }

    #[test]
    fn high_and_low_words_are_distinct() {
        let mut nonces = NonceBitmaps::new();
        let signer = addr(3);
        nonces.use_nonce(signer, 1).unwrap();
        nonces.use_nonce(signer, 257).unwrap(); // same bit index, next word
        assert!(nonces.is_set(signer, 1));
        assert!(nonces.is_set(signer, 257));
    }
}
