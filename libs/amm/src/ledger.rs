//! Internally tracked reserves and decay detection
//!
//! The ledger is the pricing view of a pair: the quote and base reserves the
//! constant-product curve is evaluated against, plus the invariant recorded at
//! the last liquidity event. The quote asset may rebase, so its actual external
//! balance drifts away from the tracked reserve between operations; that drift
//! is *decay* and is always derived from a fresh balance, never stored.

use crate::errors::{AmmError, AmmResult};
use crate::fixed_point::{abs_diff, checked_add, checked_mul, mul_div, w_div};
use ethereum_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a pair a quantity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// Elastic-supply side
    Quote,
    Base,
    /// Liquidity-claim token
    Claim,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Quote => write!(f, "quote"),
            Asset::Base => write!(f, "base"),
            Asset::Claim => write!(f, "claim"),
        }
    }
}

/// Direction of a decay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayKind {
    /// Quote supply expanded: actual balance above the tracked reserve
    QuoteExcess,
    /// Quote supply contracted: actual balance below the tracked reserve
    QuoteDeficit,
}

impl fmt::Display for DecayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayKind::QuoteExcess => write!(f, "quote-excess"),
            DecayKind::QuoteDeficit => write!(f, "quote-deficit"),
        }
    }
}

/// Mismatch between the actual quote balance and the tracked quote reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayState {
    None,
    QuoteExcess(U256),
    QuoteDeficit(U256),
}

impl DecayState {
    pub fn amount(&self) -> U256 {
        match self {
            DecayState::None => U256::zero(),
            DecayState::QuoteExcess(amount) | DecayState::QuoteDeficit(amount) => *amount,
        }
    }

    pub fn kind(&self) -> Option<DecayKind> {
        match self {
            DecayState::None => None,
            DecayState::QuoteExcess(_) => Some(DecayKind::QuoteExcess),
            DecayState::QuoteDeficit(_) => Some(DecayKind::QuoteDeficit),
        }
    }
}

/// Signed change to a reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Credit(U256),
    Debit(U256),
}

impl Delta {
    fn apply(self, reserve: U256, asset: Asset) -> AmmResult<U256> {
        match self {
            Delta::Credit(amount) => checked_add(reserve, amount, "reserve credit"),
            Delta::Debit(amount) => {
                reserve
                    .checked_sub(amount)
                    .ok_or(AmmError::ReserveUnderflow {
                        asset,
                        reserve,
                        requested: amount,
                    })
            }
        }
    }
}

/// Tracked reserves of one trading pair
///
/// Fields are only mutated by the pricing and accounting formulas of this
/// crate; callers persist and restore the ledger as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    quote_reserve: U256,
    base_reserve: U256,
    invariant_last: U256,
}

impl Ledger {
    /// Empty ledger for a new pair
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted ledger
    pub fn from_parts(quote_reserve: U256, base_reserve: U256, invariant_last: U256) -> Self {
        Self {
            quote_reserve,
            base_reserve,
            invariant_last,
        }
    }

    pub fn quote_reserve(&self) -> U256 {
        self.quote_reserve
    }

    pub fn base_reserve(&self) -> U256 {
        self.base_reserve
    }

    pub fn invariant_last(&self) -> U256 {
        self.invariant_last
    }

    /// True until the first contribution seeds the price
    pub fn is_empty(&self) -> bool {
        self.quote_reserve.is_zero() && self.base_reserve.is_zero()
    }

    /// Current `quoteReserve * baseReserve`
    pub fn invariant(&self) -> AmmResult<U256> {
        checked_mul(self.quote_reserve, self.base_reserve, "invariant")
    }

    /// Record the current invariant as the post-liquidity-event reference
    pub(crate) fn record_invariant(&mut self) -> AmmResult<()> {
        self.invariant_last = self.invariant()?;
        Ok(())
    }

    /// Compare a freshly observed quote balance against the tracked reserve
    pub fn detect_decay(&self, actual_quote: U256) -> DecayState {
        if actual_quote > self.quote_reserve {
            DecayState::QuoteExcess(actual_quote - self.quote_reserve)
        } else if actual_quote < self.quote_reserve {
            DecayState::QuoteDeficit(self.quote_reserve - actual_quote)
        } else {
            DecayState::None
        }
    }

    /// Whether decay is large enough to require resolution before a
    /// double-asset entry
    ///
    /// `decay * baseReserve / quoteReserve >= 1`: the decay priced in base at
    /// the internal ratio is worth at least one base unit. Evaluated without an
    /// intermediate ratio so it holds at any reserve magnitude.
    /// An unseeded ledger never carries actionable decay.
    pub fn is_sufficient_decay(&self, actual_quote: U256) -> AmmResult<bool> {
        if self.quote_reserve.is_zero() || self.base_reserve.is_zero() {
            return Ok(false);
        }
        let decay = abs_diff(actual_quote, self.quote_reserve);
        if decay.is_zero() {
            return Ok(false);
        }
        let decay_in_base = mul_div(decay, self.base_reserve, self.quote_reserve)?;
        Ok(decay_in_base >= U256::one())
    }

    /// Add signed deltas to both reserves, all or nothing
    pub fn apply_delta(&mut self, delta_quote: Delta, delta_base: Delta) -> AmmResult<()> {
        let quote_reserve = delta_quote.apply(self.quote_reserve, Asset::Quote)?;
        let base_reserve = delta_base.apply(self.base_reserve, Asset::Base)?;
        self.quote_reserve = quote_reserve;
        self.base_reserve = base_reserve;
        Ok(())
    }

    /// Floor-at-zero reduction used by redemption
    pub(crate) fn saturating_reduce(&mut self, quote: U256, base: U256) {
        self.quote_reserve = self.quote_reserve.saturating_sub(quote);
        self.base_reserve = self.base_reserve.saturating_sub(base);
    }

    /// Overwrite both reserves with the seeding contribution
    pub(crate) fn seed(&mut self, quote: U256, base: U256) {
        self.quote_reserve = quote;
        self.base_reserve = base;
    }

    /// Internal price `quoteReserve / baseReserve` in WAD
    pub fn quote_per_base_wad(&self) -> AmmResult<U256> {
        if self.base_reserve.is_zero() {
            return Err(AmmError::InsufficientLiquidity { asset: Asset::Base });
        }
        w_div(self.quote_reserve, self.base_reserve)
    }

    /// Quote per base as a `Decimal`, for display and logging
    ///
    /// `None` when the ledger is empty or the price exceeds `Decimal` range.
    pub fn spot_price(&self) -> Option<Decimal> {
        let ratio = self.quote_per_base_wad().ok()?;
        if ratio.bits() > 127 {
            return None;
        }
        Decimal::try_from_i128_with_scale(ratio.low_u128() as i128, 18)
            .ok()
            .map(|price| price.normalize())
    }
}
