//! Execution pipeline (§4.7-§4.10): order validation, the swap driver, the
//! unlock gate, and the bundle executor that ties them together.

pub mod bundle_executor;
pub mod order_validator;
pub mod swap_driver;
pub mod unlock_gate;

pub use bundle_executor::BundleExecutor;
pub use order_validator::{build_domain_separator, OrderExecutionContext, OrderPricing};
pub use swap_driver::{run_pool_update, SwapDriverPair};
pub use unlock_gate::{check_unlock, unlocked_fee, UnlockAttestation};
