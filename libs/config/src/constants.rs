//! Pair constants shared by the pricing engine and its configuration
//!
//! Scale factors and fee defaults used across every pricing formula. These
//! values are part of the ledger's arithmetic contract and must not change
//! for a pair once it holds liquidity.

/// Decimal places of the WAD fixed-point scale (1 WAD = 10^18)
pub const WAD_DECIMALS: usize = 18;

/// Denominator for fees expressed in basis points
pub const BASIS_POINTS: u32 = 10_000;

/// Fee defaults
pub mod fees {
    /// Default liquidity-provider fee charged on swap input (0.3%)
    pub const DEFAULT_FEE_BPS: u32 = 30;

    /// Default protocol share of invariant growth is 1 / this value
    pub const DEFAULT_PROTOCOL_FEE_DENOMINATOR: u32 = 6;
}

/// Environment overrides
pub mod env {
    /// Prefix for environment variable overrides (`ELASTIC__FEE_BPS=25`)
    pub const PREFIX: &str = "ELASTIC";

    /// Separator between prefix and nested keys
    pub const SEPARATOR: &str = "__";
}
