//! Order variants (§3 "Top-of-Block Order", "User Order", "Signature").
//!
//! A user order's bitmap packs, in field declaration order: quantity
//! variant (partial/exact), lifetime variant (standing/flash),
//! zero-for-one, use-internal, recipient presence, hook presence, signature
//! variant — seven bits, one byte. A top-of-block order's bitmap packs
//! use-internal, zero-for-one, recipient presence, and signature variant —
//! four bits. Every enum-typed field, including the plain `bool`s, folds
//! into the front bitmap (§4.2); none are read as standalone bytes.

use alloy_primitives::{Address, B256, U256};

use crate::error::Result;
use crate::pade::{decode_list, decode_option, DecodeBudget, PadeDecode, VariantBitmap};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Ecdsa { v: u8, r: B256, s: B256 },
    Contract { signer: Address, payload: Vec<u8> },
}

impl PadeDecode for Signature {
    fn pade_decode(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Self> {
        // Signature is a standalone (non-struct-field) enum when decoded on
        // its own, so it carries its own one-byte selector (§4.2).
        let is_contract = reader.read_u8()? != 0;
        if is_contract {
            let signer = reader.read_address()?;
            let payload = decode_byte_list(reader, budget)?;
            Ok(Self::Contract { signer, payload })
        } else {
            let v = reader.read_u8()?;
            let r = reader.read_b256()?;
            let s = reader.read_b256()?;
            Ok(Self::Ecdsa { v, r, s })
        }
    }
}

fn decode_byte_list(reader: &mut Reader, _budget: &mut DecodeBudget) -> Result<Vec<u8>> {
    let mut sub = reader.read_length_prefixed()?;
    let len = sub.remaining();
    let bytes = sub.read_bytes(len)?.to_vec();
    sub.require_at_end()?;
    Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hook {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuantity {
    Partial { min_in: u128, max_in: u128, filled_in: u128 },
    Exact { amount: u128, exact_in: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLifetime {
    Standing { nonce: u64, deadline: u64 },
    Flash { valid_for_block: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOrder {
    pub signer: Address,
    pub quantity: OrderQuantity,
    pub lifetime: OrderLifetime,
    pub pair_index: u16,
    pub zero_for_one: bool,
    pub use_internal: bool,
    pub min_price: U256,
    pub recipient: Option<Address>,
    pub hook: Option<(Hook, Vec<u8>)>,
    pub extra_fee_cap: u128,
    pub extra_fee: u128,
    pub signature: Signature,
}

impl PadeDecode for UserOrder {
    fn pade_decode(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Self> {
        let mut bitmap = VariantBitmap::read(reader, 7)?;
        let is_exact = bitmap.next_bit()?;
        let is_flash = bitmap.next_bit()?;
        let zero_for_one = bitmap.next_bit()?;
        let use_internal = bitmap.next_bit()?;
        let has_recipient = bitmap.next_bit()?;
        let has_hook = bitmap.next_bit()?;
        let is_contract_signature = bitmap.next_bit()?;

        let signer = reader.read_address()?;
        let pair_index = reader.read_u16()?;
        let min_price = reader.read_u256()?;

        let recipient = decode_option(has_recipient, || reader.read_address())?;
        let hook = if has_hook {
            let address = reader.read_address()?;
            let payload = decode_byte_list(reader, budget)?;
            Some((Hook { address }, payload))
        } else {
            None
        };

        let extra_fee_cap = reader.read_u128()?;
        let extra_fee = reader.read_u128()?;

        let quantity = if is_exact {
            let amount = reader.read_u128()?;
            let exact_in = reader.read_bool()?;
            OrderQuantity::Exact { amount, exact_in }
        } else {
            let min_in = reader.read_u128()?;
            let max_in = reader.read_u128()?;
            let filled_in = reader.read_u128()?;
            OrderQuantity::Partial { min_in, max_in, filled_in }
        };

        let lifetime = if is_flash {
            let valid_for_block = reader.read_u64()?;
            OrderLifetime::Flash { valid_for_block }
        } else {
            let nonce = reader.read_u64()?;
            let deadline = reader.read_u64()?;
            OrderLifetime::Standing { nonce, deadline }
        };

        let signature = if is_contract_signature {
            let signer = reader.read_address()?;
            let payload = decode_byte_list(reader, budget)?;
            Signature::Contract { signer, payload }
        } else {
            let v = reader.read_u8()?;
            let r = reader.read_b256()?;
            let s = reader.read_b256()?;
            Signature::Ecdsa { v, r, s }
        };

        Ok(Self {
            signer,
            quantity,
            lifetime,
            pair_index,
            zero_for_one,
            use_internal,
            min_price,
            recipient,
            hook,
            extra_fee_cap,
            extra_fee,
            signature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopOfBlockOrder {
    pub signer: Address,
    pub use_internal: bool,
    pub quantity_in: u128,
    pub quantity_out: u128,
    pub max_gas_asset0: u128,
    pub gas_used_asset0: u128,
    pub pair_index: u16,
    pub zero_for_one: bool,
    pub recipient: Option<Address>,
    pub signature: Signature,
}

impl PadeDecode for TopOfBlockOrder {
    fn pade_decode(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Self> {
        let mut bitmap = VariantBitmap::read(reader, 4)?;
        let use_internal = bitmap.next_bit()?;
        let zero_for_one = bitmap.next_bit()?;
        let has_recipient = bitmap.next_bit()?;
        let is_contract_signature = bitmap.next_bit()?;

        let signer = reader.read_address()?;
        let quantity_in = reader.read_u128()?;
        let quantity_out = reader.read_u128()?;
        let max_gas_asset0 = reader.read_u128()?;
        let gas_used_asset0 = reader.read_u128()?;
        let pair_index = reader.read_u16()?;
        let recipient = decode_option(has_recipient, || reader.read_address())?;

        let signature = if is_contract_signature {
            let signer = reader.read_address()?;
            let payload = decode_byte_list(reader, budget)?;
            Signature::Contract { signer, payload }
        } else {
            let v = reader.read_u8()?;
            let r = reader.read_b256()?;
            let s = reader.read_b256()?;
            Signature::Ecdsa { v, r, s }
        };

        Ok(Self {
            signer,
            use_internal,
            quantity_in,
            quantity_out,
            max_gas_asset0,
            gas_used_asset0,
            pair_index,
            zero_for_one,
            recipient,
            signature,
        })
    }
}

pub fn decode_top_of_block_orders(
    reader: &mut Reader,
    budget: &mut DecodeBudget,
) -> Result<Vec<TopOfBlockOrder>> {
    decode_list(reader, budget)
}

pub fn decode_user_orders(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Vec<UserOrder>> {
    decode_list(reader, budget)
}
