//! Fatal error taxonomy for the settlement core.
//!
//! Every error here aborts the bundle: nothing in the pipeline recovers from
//! one of these, they all propagate to the entry point with `?` and the
//! caller reverts whatever state it was mutating (§7).

use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AngstromError {
    // ---- structure ----
    #[error("reader finished with unconsumed bytes")]
    ReaderNotAtEnd,
    #[error("attempted to read past the end of the buffer")]
    ReadOutOfBounds,
    #[error("list length prefix exceeds the 3-byte ceiling")]
    ListTooLong,
    #[error("assets list is not strictly ascending by address, or contains a duplicate")]
    AssetsOutOfOrderOrNotUnique,
    #[error("pairs list is not strictly ascending by (index0, index1), or contains a duplicate")]
    OutOfOrderOrDuplicatePairs,
    #[error("pair index0 must be strictly less than index1")]
    PairAssetsWrong,
    #[error("decode step budget exhausted")]
    DecodeBudgetExceeded,

    // ---- config ----
    #[error("config store index may have changed since the bundle was built")]
    IndexMayHaveChanged,
    #[error("config store entry key does not match the pair at that index")]
    EntryKeyMismatch,
    #[error("tick spacing is invalid for this pool")]
    InvalidTickSpacing,
    #[error("bundle fee exceeds the configured maximum")]
    FeeAboveMax,
    #[error("unlocked fee exceeds the configured maximum")]
    UnlockFeeAboveMax,
    #[error("unlocked fee has not been configured for this pair")]
    UnlockedFeeNotSet,

    // ---- lifecycle ----
    #[error("caller is not the controller")]
    NotController,
    #[error("caller is not an active operator")]
    NotOperator,
    #[error("a bundle has already executed this block")]
    OnlyOncePerBlock,
    #[error("direct AMM swaps are disallowed while the block is locked and unattested")]
    CannotSwapWhileLocked,
    #[error("unlock attestation data is too short to decode")]
    UnlockDataTooShort,

    // ---- order ----
    #[error("nonce has already been used")]
    NonceReuse,
    #[error("order has already executed within this bundle")]
    OrderAlreadyExecuted,
    #[error("order has expired")]
    Expired,
    #[error("fill amount is below the order's minimum")]
    FillingTooLittle,
    #[error("fill amount exceeds the order's maximum")]
    FillingTooMuch,
    #[error("gas used exceeds the order's cap")]
    GasAboveMax,
    #[error("signature failed to verify")]
    InvalidSignature,
    #[error("composable hook did not return the expected magic value")]
    InvalidHookReturn,
    #[error("order carries an unsupported permit/signature variant")]
    InvalidPermitType,
    #[error("price limit was not satisfied")]
    PriceViolation,
    #[error("extra fee exceeds the order's cap")]
    ExtraFeeAboveMax,

    // ---- execution ----
    #[error("delta for asset {0} did not resolve to zero at settlement")]
    BundleDeltaUnresolved(Address),
    #[error("reward loop's ending liquidity does not match the pool's liquidity")]
    WrongEndLiquidity,
    #[error("just-in-time liquidity change detected (checksum or liquidity mismatch)")]
    JustInTimeLiquidityChange,
    #[error("pair references an asset index out of range")]
    AssetIndexOutOfRange,
    #[error("pool update references a pair index out of range")]
    PairIndexOutOfRange,

    // ---- arithmetic ----
    #[error("arithmetic overflow or underflow")]
    ArithmeticOverflowUnderflow,
}

pub type Result<T> = core::result::Result<T, AngstromError>;
