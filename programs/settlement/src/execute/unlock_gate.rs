//! Unlock Gate (§4.10): the pre-swap hook an external (non-bundle) AMM
//! swap must pass before the pool will execute it.

use alloy_primitives::{keccak256, Address, B256};

use crate::error::{AngstromError, Result};
use crate::host::SignatureVerifier;
use crate::states::auth::AuthState;
use crate::states::config_store::{PairKey, PoolConfigStore};
use crate::typed_data::ATTEST_EMPTY_BLOCK_TYPEHASH;

/// `keccak256("AttestAngstromBlockEmpty(uint64)") || block` (§4.9 "Empty-block
/// attestation"). This digest is signed directly — no EIP-712 domain
/// wrapper — since the attestation is block-scoped and contract-agnostic.
fn empty_block_attestation_digest(block: u64) -> B256 {
    let mut buf = [0u8; 32 + 8];
    buf[..32].copy_from_slice(ATTEST_EMPTY_BLOCK_TYPEHASH.as_slice());
    buf[32..].copy_from_slice(&block.to_be_bytes());
    keccak256(buf)
}

/// Optional unlock data an external swapper attaches: `(operator, ecdsa
/// signature)` attesting the block carried no bundle.
pub struct UnlockAttestation {
    pub operator: Address,
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

/// The pre-swap hook (§4.10): if the block is already attested, the swap
/// proceeds with the pair's `unlocked-fee`. Otherwise `unlock_data` must
/// carry a valid operator attestation, or the swap is rejected.
pub fn check_unlock(
    auth: &mut AuthState,
    signature_verifier: &dyn SignatureVerifier,
    current_block: u64,
    unlock_data: Option<&UnlockAttestation>,
) -> Result<()> {
    if auth.is_attested(current_block) {
        return Ok(());
    }

    let attestation = unlock_data.ok_or(AngstromError::CannotSwapWhileLocked)?;
    auth.require_operator(attestation.operator)?;

    let digest = empty_block_attestation_digest(current_block);
    let valid =
        signature_verifier.verify_ecdsa(attestation.operator, digest, attestation.v, attestation.r, attestation.s)?;
    if !valid {
        return Err(AngstromError::CannotSwapWhileLocked);
    }

    auth.attest_empty_block(current_block)?;
    Ok(())
}

/// Looks up the fee to apply to an unlocked external swap (§4.10: "The
/// applied fee is the pair's unlocked-fee").
pub fn unlocked_fee(store: &PoolConfigStore, key: PairKey) -> Result<u32> {
    store.unlocked_fee(key)
}
