//! Protocol share of invariant growth
//!
//! Swap fees grow `quoteReserve * baseReserve` between liquidity events. On
//! the next issuance or redemption a configurable fraction of that growth is
//! minted as claim tokens for the protocol, before the caller's own quantities
//! are computed, so the caller neither pays for nor captures it.

use crate::errors::{AmmError, AmmResult};
use crate::fixed_point::{checked_add, checked_mul, mul_div};
use crate::ledger::Ledger;
use elastic_config::PairConfig;
use ethereum_types::U256;
use std::num::NonZeroU32;
use tracing::trace;

/// Protocol fee schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolFee {
    share_denominator: Option<NonZeroU32>,
}

impl ProtocolFee {
    pub const fn disabled() -> Self {
        Self {
            share_denominator: None,
        }
    }

    /// Protocol receives `1 / denominator` of the growth in `sqrt(k)`
    pub fn share(denominator: NonZeroU32) -> Self {
        Self {
            share_denominator: Some(denominator),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.share_denominator.is_some()
    }

    /// Claim tokens owed to the protocol for growth since `invariant_last`
    ///
    /// `supply * (rootK - rootKLast) / (rootK * (d - 1) + rootKLast)`
    pub fn accrued_claim(&self, claim_supply: U256, ledger: &Ledger) -> AmmResult<U256> {
        let Some(denominator) = self.share_denominator else {
            return Ok(U256::zero());
        };
        if claim_supply.is_zero() || ledger.invariant_last().is_zero() {
            return Ok(U256::zero());
        }

        let root_k = ledger.invariant()?.integer_sqrt();
        let root_k_last = ledger.invariant_last().integer_sqrt();
        if root_k <= root_k_last {
            return Ok(U256::zero());
        }

        let weight = U256::from(denominator.get() - 1);
        let denominator = checked_add(
            checked_mul(root_k, weight, "protocol fee")?,
            root_k_last,
            "protocol fee",
        )?;
        if denominator.is_zero() {
            return Err(AmmError::InvariantViolation(
                "protocol fee denominator is zero with a non-zero invariant",
            ));
        }
        let fee = mul_div(claim_supply, root_k - root_k_last, denominator)?;
        trace!(%root_k, %root_k_last, %fee, "Protocol fee accrued");
        Ok(fee)
    }
}

impl From<&PairConfig> for ProtocolFee {
    fn from(config: &PairConfig) -> Self {
        match config.protocol_fee_denominator().and_then(NonZeroU32::new) {
            Some(denominator) => Self::share(denominator),
            None => Self::disabled(),
        }
    }
}
