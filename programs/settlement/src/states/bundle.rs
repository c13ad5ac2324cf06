//! Top-level bundle (§6 "PADE wire format"): five top-level lists and no
//! outer variant bitmap, since none of the bundle's own fields are
//! enum-typed — only fields nested inside `PoolUpdate`, `UserOrder`, and
//! `TopOfBlockOrder` carry bitmaps.

use crate::error::Result;
use crate::pade::DecodeBudget;
use crate::reader::Reader;
use crate::states::asset::{validate_assets_ordered, Asset};
use crate::states::order::{decode_top_of_block_orders, decode_user_orders, TopOfBlockOrder, UserOrder};
use crate::states::pair::{validate_pairs_ordered, Pair};
use crate::states::pool_update::{decode_pool_updates, PoolUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub assets: Vec<Asset>,
    pub pairs: Vec<Pair>,
    pub pool_updates: Vec<PoolUpdate>,
    pub top_of_block_orders: Vec<TopOfBlockOrder>,
    pub user_orders: Vec<UserOrder>,
}

impl Bundle {
    /// Decodes the bundle and checks the structural invariants (I2, I3) that
    /// apply to its own lists, independent of any pool or config state.
    pub fn decode(reader: &mut Reader, budget: &mut DecodeBudget) -> Result<Self> {
        use crate::pade::decode_list;

        let assets: Vec<Asset> = decode_list(reader, budget)?;
        validate_assets_ordered(&assets)?;

        let pairs: Vec<Pair> = decode_list(reader, budget)?;
        validate_pairs_ordered(&pairs)?;

        let pool_updates = decode_pool_updates(reader, budget)?;
        let top_of_block_orders = decode_top_of_block_orders(reader, budget)?;
        let user_orders = decode_user_orders(reader, budget)?;

        reader.require_at_end()?;

        Ok(Self { assets, pairs, pool_updates, top_of_block_orders, user_orders })
    }
}
