//! # Elastic AMM Configuration
//!
//! Configuration management and constants for elastic-supply trading pairs,
//! keeping fee schedules and rounding policies out of the pricing code.
//!
//! ## Features
//!
//! - **Arithmetic Constants**: WAD scale, basis-point denominator
//! - **Fee Defaults**: liquidity fee and protocol share of invariant growth
//! - **Pair Configuration**: TOML files with environment variable overrides
//!
//! ## Usage
//!
//! ```rust
//! use elastic_config::{constants, PairConfig};
//!
//! let config = PairConfig::default();
//! assert_eq!(config.fee_bps, constants::fees::DEFAULT_FEE_BPS);
//! assert!(config.validate().is_ok());
//! ```

pub mod constants;
pub mod pair_config;

// Re-export commonly used types
pub use constants::{BASIS_POINTS, WAD_DECIMALS};
pub use pair_config::{load_config, BadRatioPolicy, PairConfig, ProtocolFeeConfig};
