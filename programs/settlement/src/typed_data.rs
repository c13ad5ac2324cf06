//! Typed-data (EIP-712-style) struct hashing for the five order variants
//! (§4.7). Signature *recovery* is delegated to `host::SignatureVerifier`;
//! this module only reconstructs the digest that gets recovered against.

use alloy_primitives::{b256, keccak256, Address, B256, U256};

pub const EIP712_DOMAIN_TYPEHASH: B256 =
    b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f");

pub const PARTIAL_STANDING_ORDER_TYPEHASH: B256 =
    b256!("1fcf314502c5ce914d01d7365b8d03b977531e991e5cbed535e8f1839c0f0646");
pub const EXACT_STANDING_ORDER_TYPEHASH: B256 =
    b256!("7ef8553ad04423cfc7ec8106d5405cf5df43becc2881d6aee1151bba99c80e1f");
pub const PARTIAL_FLASH_ORDER_TYPEHASH: B256 =
    b256!("fc5583e6b7f1cb9e383213ad320c0d50f6dcf95315f65b3c2c5c46837c0854ad");
pub const EXACT_FLASH_ORDER_TYPEHASH: B256 =
    b256!("a3655d9abc98e94324e2219f5649f82b09c25646486ad221d4f1216b48493e7b");
pub const TOP_OF_BLOCK_ORDER_TYPEHASH: B256 =
    b256!("c9edaf6377f93ff09149ea8c1798a96f4d7f31505ab2e5dc810aaf8f51d17acd");

pub const ATTEST_EMPTY_BLOCK_TYPEHASH: B256 =
    b256!("fb5e3a2d8df4201f9a7525c1d7eaa2586027f1ea035956250ddb986c9b3510bc");

/// `keccak256("Angstrom.hook.return-magic")`'s low 4 bytes.
pub const HOOK_RETURN_MAGIC: u32 = 0x23ea_ee8b;

pub struct DomainSeparator {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainSeparator {
    /// `name = "Angstrom"`, `version = "v1"` are fixed (§4.7).
    pub fn hash(&self) -> B256 {
        let name_hash = keccak256(b"Angstrom");
        let version_hash = keccak256(b"v1");
        let mut buf = [0u8; 32 * 5];
        buf[0..32].copy_from_slice(EIP712_DOMAIN_TYPEHASH.as_slice());
        buf[32..64].copy_from_slice(name_hash.as_slice());
        buf[64..96].copy_from_slice(version_hash.as_slice());
        buf[96..128].copy_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        buf[128 + 12..160].copy_from_slice(self.verifying_contract.as_slice());
        keccak256(buf)
    }
}

/// `keccak256(0x1901 || domain_separator || struct_hash)` (§4.7).
pub fn digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut buf = [0u8; 2 + 32 + 32];
    buf[0] = 0x19;
    buf[1] = 0x01;
    buf[2..34].copy_from_slice(domain_separator.as_slice());
    buf[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

fn word_u256(buf: &mut Vec<u8>, v: U256) {
    buf.extend_from_slice(&v.to_be_bytes::<32>());
}

fn word_u128(buf: &mut Vec<u8>, v: u128) {
    word_u256(buf, U256::from(v));
}

fn word_u64(buf: &mut Vec<u8>, v: u64) {
    word_u256(buf, U256::from(v));
}

fn word_u16(buf: &mut Vec<u8>, v: u16) {
    word_u256(buf, U256::from(v));
}

fn word_bool(buf: &mut Vec<u8>, v: bool) {
    word_u256(buf, U256::from(v as u8));
}

fn word_address(buf: &mut Vec<u8>, v: Address) {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(v.as_slice());
    buf.extend_from_slice(&word);
}

fn word_hash(buf: &mut Vec<u8>, v: B256) {
    buf.extend_from_slice(v.as_slice());
}

/// Fields common to every `UserOrder` struct hash, in declaration order
/// (§4.7 "Typed-data hashing"): everything up to and including the hook
/// data hash is identical across the four user-order variants, which differ
/// only in their typehash and their trailing quantity/lifetime words.
struct UserOrderCommonFields<'a> {
    pair_index: u16,
    zero_for_one: bool,
    use_internal: bool,
    min_price: U256,
    recipient: Option<Address>,
    hook_data_hash: B256,
    extra_fee_cap: u128,
    extra_fee: u128,
    _marker: core::marker::PhantomData<&'a ()>,
}

fn push_common_fields(buf: &mut Vec<u8>, f: &UserOrderCommonFields) {
    word_u16(buf, f.pair_index);
    word_bool(buf, f.zero_for_one);
    word_bool(buf, f.use_internal);
    word_u256(buf, f.min_price);
    word_address(buf, f.recipient.unwrap_or(Address::ZERO));
    word_hash(buf, f.hook_data_hash);
    word_u128(buf, f.extra_fee_cap);
    word_u128(buf, f.extra_fee);
}

#[allow(clippy::too_many_arguments)]
pub fn exact_user_order_struct_hash(
    is_flash: bool,
    pair_index: u16,
    zero_for_one: bool,
    use_internal: bool,
    min_price: U256,
    recipient: Option<Address>,
    hook_data_hash: B256,
    extra_fee_cap: u128,
    extra_fee: u128,
    amount: u128,
    exact_in: bool,
    nonce_or_valid_block: u64,
    deadline: Option<u64>,
) -> B256 {
    let typehash = if is_flash { EXACT_FLASH_ORDER_TYPEHASH } else { EXACT_STANDING_ORDER_TYPEHASH };
    let mut buf = Vec::with_capacity(32 * 12);
    word_hash(&mut buf, typehash);
    push_common_fields(
        &mut buf,
        &UserOrderCommonFields {
            pair_index,
            zero_for_one,
            use_internal,
            min_price,
            recipient,
            hook_data_hash,
            extra_fee_cap,
            extra_fee,
            _marker: core::marker::PhantomData,
        },
    );
    word_u128(&mut buf, amount);
    word_bool(&mut buf, exact_in);
    word_u64(&mut buf, nonce_or_valid_block);
    if let Some(deadline) = deadline {
        word_u64(&mut buf, deadline);
    }
    keccak256(buf)
}

#[allow(clippy::too_many_arguments)]
pub fn partial_user_order_struct_hash(
    is_flash: bool,
    pair_index: u16,
    zero_for_one: bool,
    use_internal: bool,
    min_price: U256,
    recipient: Option<Address>,
    hook_data_hash: B256,
    extra_fee_cap: u128,
    extra_fee: u128,
    min_in: u128,
    max_in: u128,
    filled_in: u128,
    nonce_or_valid_block: u64,
    deadline: Option<u64>,
) -> B256 {
    let typehash = if is_flash { PARTIAL_FLASH_ORDER_TYPEHASH } else { PARTIAL_STANDING_ORDER_TYPEHASH };
    let mut buf = Vec::with_capacity(32 * 13);
    word_hash(&mut buf, typehash);
    push_common_fields(
        &mut buf,
        &UserOrderCommonFields {
            pair_index,
            zero_for_one,
            use_internal,
            min_price,
            recipient,
            hook_data_hash,
            extra_fee_cap,
            extra_fee,
            _marker: core::marker::PhantomData,
        },
    );
    word_u128(&mut buf, min_in);
    word_u128(&mut buf, max_in);
    word_u128(&mut buf, filled_in);
    word_u64(&mut buf, nonce_or_valid_block);
    if let Some(deadline) = deadline {
        word_u64(&mut buf, deadline);
    }
    keccak256(buf)
}

#[allow(clippy::too_many_arguments)]
pub fn top_of_block_order_struct_hash(
    use_internal: bool,
    quantity_in: u128,
    quantity_out: u128,
    max_gas_asset0: u128,
    gas_used_asset0: u128,
    pair_index: u16,
    zero_for_one: bool,
    recipient: Option<Address>,
) -> B256 {
    let mut buf = Vec::with_capacity(32 * 9);
    word_hash(&mut buf, TOP_OF_BLOCK_ORDER_TYPEHASH);
    word_bool(&mut buf, use_internal);
    word_u128(&mut buf, quantity_in);
    word_u128(&mut buf, quantity_out);
    word_u128(&mut buf, max_gas_asset0);
    word_u128(&mut buf, gas_used_asset0);
    word_u16(&mut buf, pair_index);
    word_bool(&mut buf, zero_for_one);
    word_address(&mut buf, recipient.unwrap_or(Address::ZERO));
    keccak256(buf)
}

/// `keccak256(hook_address || payload)`, folded into a signed order's
/// struct hash as the `hookDataHash` field when a hook is present; the
/// zero hash when it is absent (§4.7 step 4).
pub fn hook_data_hash(hook: Option<(Address, &[u8])>) -> B256 {
    match hook {
        None => B256::ZERO,
        Some((address, payload)) => {
            let mut buf = Vec::with_capacity(20 + payload.len());
            buf.extend_from_slice(address.as_slice());
            buf.extend_from_slice(payload);
            keccak256(buf)
        }
    }
}
