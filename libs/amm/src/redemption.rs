//! Pro-rata redemption of liquidity claims
//!
//! Payouts are a share of the *actual* balances, so a redeemer carries their
//! part of any unresolved decay. The tracked reserves shrink by the same share
//! of the *tracked* values, floored at zero.

use crate::errors::{AmmError, AmmResult};
use crate::fixed_point::{checked_add, mul_div};
use crate::ledger::{Asset, Ledger};
use crate::protocol_fee::ProtocolFee;
use ethereum_types::U256;
use tracing::debug;

/// Claim tokens to burn and the minimum acceptable payouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveLiquidityParams {
    pub claim_qty: U256,
    pub min_quote: U256,
    pub min_base: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedemptionOutcome {
    pub quote_out: U256,
    pub base_out: U256,
    /// Claim tokens to mint to the protocol fee recipient before burning
    pub protocol_fee_claim: U256,
}

pub fn compute_remove_liquidity(
    params: RemoveLiquidityParams,
    actual_quote: U256,
    actual_base: U256,
    claim_supply: U256,
    protocol_fee: ProtocolFee,
    ledger: &mut Ledger,
) -> AmmResult<RedemptionOutcome> {
    let claim_qty = params.claim_qty;
    if claim_qty > claim_supply {
        return Err(AmmError::ReserveUnderflow {
            asset: Asset::Claim,
            reserve: claim_supply,
            requested: claim_qty,
        });
    }
    if claim_qty.is_zero() {
        return Ok(RedemptionOutcome::default());
    }

    let mut scratch = *ledger;
    let protocol_fee_claim = protocol_fee.accrued_claim(claim_supply, &scratch)?;
    let supply = checked_add(claim_supply, protocol_fee_claim, "claim supply")?;

    let quote_out = mul_div(claim_qty, actual_quote, supply)?;
    let base_out = mul_div(claim_qty, actual_base, supply)?;
    if quote_out < params.min_quote {
        return Err(AmmError::SlippageExceeded {
            asset: Asset::Quote,
            computed: quote_out,
            minimum: params.min_quote,
        });
    }
    if base_out < params.min_base {
        return Err(AmmError::SlippageExceeded {
            asset: Asset::Base,
            computed: base_out,
            minimum: params.min_base,
        });
    }

    let quote_reduction = mul_div(claim_qty, scratch.quote_reserve(), supply)?;
    let base_reduction = mul_div(claim_qty, scratch.base_reserve(), supply)?;
    scratch.saturating_reduce(quote_reduction, base_reduction);
    scratch.record_invariant()?;
    *ledger = scratch;

    debug!(
        %claim_qty,
        %quote_out,
        %base_out,
        %protocol_fee_claim,
        quote_reserve = %ledger.quote_reserve(),
        base_reserve = %ledger.base_reserve(),
        "Liquidity removed"
    );
    Ok(RedemptionOutcome {
        quote_out,
        base_out,
        protocol_fee_claim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(exp: usize) -> U256 {
        U256::exp10(exp)
    }

    fn redeem(claim_qty: U256) -> RemoveLiquidityParams {
        RemoveLiquidityParams {
            claim_qty,
            ..RemoveLiquidityParams::default()
        }
    }

    #[test]
    fn test_pays_share_of_actual_balances() {
        let mut ledger = Ledger::from_parts(e(24), e(24), e(48));
        // Quote expanded by 10% since the last event
        let actual_quote = e(24) + e(23);

        let outcome = compute_remove_liquidity(
            redeem(e(23)),
            actual_quote,
            e(24),
            e(24),
            ProtocolFee::disabled(),
            &mut ledger,
        )
        .unwrap();

        assert_eq!(outcome.quote_out, e(23) + e(22));
        assert_eq!(outcome.base_out, e(23));
        // Tracked reserves shrink by the tracked share, not the payout
        assert_eq!(ledger.quote_reserve(), e(24) - e(23));
        assert_eq!(ledger.base_reserve(), e(24) - e(23));
        assert_eq!(ledger.invariant_last(), ledger.invariant().unwrap());
    }

    #[test]
    fn test_full_redemption_empties_ledger() {
        let mut ledger = Ledger::from_parts(e(20), e(18), e(38));
        let outcome = compute_remove_liquidity(
            redeem(e(18)),
            e(20) / 2,
            e(18),
            e(18),
            ProtocolFee::disabled(),
            &mut ledger,
        )
        .unwrap();

        assert_eq!(outcome.quote_out, e(20) / 2);
        assert_eq!(outcome.base_out, e(18));
        assert!(ledger.is_empty());
        assert_eq!(ledger.invariant_last(), U256::zero());
    }

    #[test]
    fn test_zero_claim_returns_nothing() {
        let mut ledger = Ledger::from_parts(e(20), e(20), e(40));
        let before = ledger;
        let outcome = compute_remove_liquidity(
            redeem(U256::zero()),
            e(20),
            e(20),
            e(20),
            ProtocolFee::disabled(),
            &mut ledger,
        )
        .unwrap();
        assert_eq!(outcome, RedemptionOutcome::default());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_rejects_claim_above_supply() {
        let mut ledger = Ledger::from_parts(e(20), e(20), e(40));
        let err = compute_remove_liquidity(
            redeem(e(20) + U256::one()),
            e(20),
            e(20),
            e(20),
            ProtocolFee::disabled(),
            &mut ledger,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AmmError::ReserveUnderflow {
                asset: Asset::Claim,
                reserve: e(20),
                requested: e(20) + U256::one(),
            }
        );
    }

    #[test]
    fn test_minimums_leave_ledger_untouched() {
        let mut ledger = Ledger::from_parts(e(20), e(20), e(40));
        let before = ledger;
        let err = compute_remove_liquidity(
            RemoveLiquidityParams {
                claim_qty: e(19),
                min_quote: U256::zero(),
                min_base: e(19) + U256::one(),
            },
            e(20),
            e(20),
            e(20),
            ProtocolFee::disabled(),
            &mut ledger,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AmmError::SlippageExceeded {
                asset: Asset::Base,
                computed: e(19),
                minimum: e(19) + U256::one(),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_protocol_fee_dilutes_redeemer() {
        // Invariant quadrupled since the last event
        let mut ledger = Ledger::from_parts(U256::from(400), U256::from(400), U256::from(10_000));
        let fee = ProtocolFee::share(std::num::NonZeroU32::new(6).unwrap());

        let outcome = compute_remove_liquidity(
            redeem(U256::from(50)),
            U256::from(400),
            U256::from(400),
            U256::from(100),
            fee,
            &mut ledger,
        )
        .unwrap();

        // 14 fee claims minted: 50 * 400 / 114
        assert_eq!(outcome.protocol_fee_claim, U256::from(14));
        assert_eq!(outcome.quote_out, U256::from(175));
        assert_eq!(outcome.base_out, U256::from(175));
        assert_eq!(ledger.quote_reserve(), U256::from(225));
    }
}
