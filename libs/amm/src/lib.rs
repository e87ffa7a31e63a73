//! # Elastic AMM - Reserve Ledger and Pricing Engine
//!
//! ## Purpose
//!
//! Pricing and accounting core for constant-product pairs whose quote asset has
//! elastic (rebasing) supply. The quote balance the pair actually holds can
//! change between any two operations without a trade; this crate detects the
//! resulting *decay* against the internally tracked reserves and keeps issuance,
//! swaps and redemptions fair in its presence.
//!
//! ## Integration Points
//!
//! - **Input Sources**: actual quote/base balances and claim supply, read fresh by
//!   the host for every operation through [`PoolBalances`]
//! - **Output Destinations**: quantities for the host to transfer, mint and burn
//!   ([`AddLiquidityOutcome`], [`SingleAssetOutcome`], [`RedemptionOutcome`])
//! - **Persistence**: the [`Ledger`] (`quoteReserve`, `baseReserve`,
//!   `invariantLast`) is the only state and serializes with serde
//! - **Configuration**: swap fee, protocol fee share and bad-ratio policy from
//!   [`elastic_config::PairConfig`]
//! - **Precision**: `U256` quantities in native token units, WAD (10^18) ratios,
//!   512-bit intermediates; no floating point anywhere
//!
//! ## Architecture Role
//!
//! ```text
//!   host balances ─┐
//!                  ▼
//!   ┌──────────────────────┐   decay?   ┌────────────────────────────┐
//!   │ ledger               │ ─────────► │ liquidity                  │
//!   │ detect / threshold   │            │ double / single / combined │
//!   └──────────────────────┘            └────────────────────────────┘
//!            │    ▲                                   │
//!            ▼    │ deltas                            ▼
//!   ┌──────────────────────┐            ┌────────────────────────────┐
//!   │ swap                 │            │ redemption                 │
//!   │ fee-adjusted x*y=k   │            │ pro-rata of actual         │
//!   └──────────────────────┘            └────────────────────────────┘
//!                  all built on fixed_point (WAD, mul_div)
//! ```
//!
//! Every public operation computes on a copy of the ledger and commits only on
//! success, so a failed call never leaves the reserves partially updated.

pub mod errors;
pub mod fixed_point;
pub mod ledger;
pub mod liquidity;
pub mod pair;
pub mod pool_traits;
pub mod protocol_fee;
pub mod redemption;
pub mod swap;

pub use errors::{AmmError, AmmResult};
pub use fixed_point::WAD;
pub use ledger::{Asset, DecayKind, DecayState, Delta, Ledger};
pub use liquidity::{
    compute_add_base_only_liquidity, compute_add_liquidity, compute_add_quote_only_liquidity,
    AddLiquidityOutcome, AddLiquidityParams, SingleAssetOutcome,
};
pub use pair::ElasticPair;
pub use pool_traits::{BalanceSnapshot, PoolBalances};
pub use protocol_fee::ProtocolFee;
pub use redemption::{compute_remove_liquidity, RedemptionOutcome, RemoveLiquidityParams};
pub use swap::{compute_swap_base_for_quote, compute_swap_quote_for_base, price_after_fee};

/// Common types for ledger quantities
pub use elastic_config::BadRatioPolicy;
pub use ethereum_types::U256;
pub use rust_decimal::Decimal;
