//! Error types for ledger arithmetic and liquidity accounting
//!
//! Every variant is terminal for the operation that produced it: the ledger is
//! left exactly as it was before the call, and the caller is expected to
//! resubmit with corrected inputs.

use crate::ledger::{Asset, DecayKind};
use ethereum_types::U256;
use thiserror::Error;

/// Errors that can occur while pricing or accounting against a ledger
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// A required input quantity is zero
    #[error("Insufficient {asset} quantity: a positive amount is required")]
    InsufficientQuantity { asset: Asset },

    /// The operation needs a reserve that is empty
    #[error("Insufficient liquidity: {asset} reserve is empty")]
    InsufficientLiquidity { asset: Asset },

    /// A computed quantity is below the caller's minimum
    #[error("Slippage exceeded: {asset} quantity {computed} is below minimum {minimum}")]
    SlippageExceeded {
        asset: Asset,
        computed: U256,
        minimum: U256,
    },

    /// A decay-correcting entry was requested without actionable decay
    #[error("No actionable {expected} decay present")]
    NoDecayPresent { expected: DecayKind },

    /// The decay-correcting contribution rounds to nothing
    #[error("Decay resolution too small: {asset} contribution of {offered} changes no decay")]
    DecayResolutionTooSmall { asset: Asset, offered: U256 },

    /// Desired quantities cannot be honored at the current price ratio
    #[error("Bad ratio: {desired_quote} quote / {desired_base} base cannot be matched at the current price")]
    BadRatio {
        desired_quote: U256,
        desired_base: U256,
    },

    /// A tracked reserve (or the claim supply) would go negative
    #[error("Reserve underflow: {asset} reserve {reserve} cannot cover {requested}")]
    ReserveUnderflow {
        asset: Asset,
        reserve: U256,
        requested: U256,
    },

    /// An intermediate or final value does not fit in 256 bits
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in fixed-point arithmetic")]
    DivisionByZero,

    /// Fee outside `[0, 10000)` basis points
    #[error("Invalid fee: {fee_bps} bps must be below 10000")]
    InvalidFee { fee_bps: u32 },

    /// An internal invariant that should be unreachable was broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Result alias used throughout the crate
pub type AmmResult<T> = Result<T, AmmError>;
