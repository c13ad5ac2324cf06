pub mod fixed_point;
pub mod full_math;
pub mod liquidity_math;
pub mod tick_math;

pub use fixed_point::*;
pub use full_math::*;
pub use liquidity_math::*;
pub use tick_math::*;
