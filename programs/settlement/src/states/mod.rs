pub mod asset;
pub mod auth;
pub mod balance;
pub mod bundle;
pub mod config_store;
pub mod delta;
pub mod growth;
pub mod nonce;
pub mod order;
pub mod pair;
pub mod pool_update;
pub mod position;

pub use asset::Asset;
pub use auth::AuthState;
pub use balance::InternalBalances;
pub use bundle::Bundle;
pub use config_store::{pair_key, PairKey, PoolConfigEntry, PoolConfigStore};
pub use delta::DeltaTracker;
pub use growth::PoolRewards;
pub use nonce::NonceBitmaps;
pub use order::{Hook, OrderLifetime, OrderQuantity, Signature, TopOfBlockOrder, UserOrder};
pub use pair::Pair;
pub use pool_update::{PoolUpdate, RewardsUpdate};
pub use position::{Position, PositionLedger};
