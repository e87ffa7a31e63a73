//! Liquidity issuance for elastic-supply pairs
//!
//! Three entry modes share one ledger:
//!
//! - **Double-asset entry**: both assets at the current reserve ratio. Only
//!   allowed while decay is below the actionable threshold.
//! - **Single-asset entry**: only the asset that resolves the current decay.
//!   Quote-excess decay is resolved with base, quote-deficit decay with quote.
//!   Issuance is weighted by how much of the decay the contribution resolves,
//!   so it never earns more than an equivalent double-asset entry.
//! - **Combined entry**: single-asset entry first, then double-asset entry with
//!   whatever the caller offered beyond it, against the updated reserves.
//!
//! ## Architecture Role
//!
//! ```text
//! actual balances ──► detect decay ──► none / below threshold ──► double-asset entry
//!                                  └─► actionable ──► single-asset entry ──► double-asset entry
//!                                                           (leftover desired quantities)
//! ```
//!
//! Every public entry point computes against a copy of the ledger and commits
//! it only when the whole operation succeeds.

use crate::errors::{AmmError, AmmResult};
use crate::fixed_point::{checked_add, mul_div, mul_div_round, w_div, w_mul, WAD};
use crate::ledger::{Asset, DecayKind, DecayState, Delta, Ledger};
use crate::protocol_fee::ProtocolFee;
use elastic_config::BadRatioPolicy;
use ethereum_types::U256;
use tracing::{debug, trace, warn};

/// Quantities a provider offers for a double-asset or combined entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddLiquidityParams {
    pub desired_quote: U256,
    pub desired_base: U256,
    pub min_quote: U256,
    pub min_base: U256,
}

/// Result of [`compute_add_liquidity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddLiquidityOutcome {
    pub quote_used: U256,
    pub base_used: U256,
    /// Claim tokens to mint to the provider
    pub claim_issued: U256,
    /// Claim tokens to mint to the protocol fee recipient
    pub protocol_fee_claim: U256,
    /// Offered quote the pair did not take; must be returned to the provider
    pub quote_unconsumed: U256,
    /// Offered base the pair did not take; must be returned to the provider
    pub base_unconsumed: U256,
}

/// Result of a single-asset entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingleAssetOutcome {
    pub used: U256,
    pub claim_issued: U256,
    pub protocol_fee_claim: U256,
}

#[derive(Debug, Clone, Copy, Default)]
struct Contribution {
    quote: U256,
    base: U256,
    claim: U256,
}

/// Claim tokens for a double-asset entry: `base_used * supply / base_balance`
pub fn double_asset_claim(base_used: U256, claim_supply: U256, base_balance: U256) -> AmmResult<U256> {
    if base_balance.is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Base });
    }
    mul_div(base_used, claim_supply, base_balance)
}

/// Claim tokens for a decay-resolving single-asset entry
///
/// `γ = (contributed / reserve_after / 2) * (decay_change / decay)` and
/// `claim = supply * γ / (1 - γ)`, evaluated in WAD fixed point.
pub fn single_asset_claim(
    claim_supply: U256,
    contributed: U256,
    reserve_after: U256,
    decay_change: U256,
    decay: U256,
) -> AmmResult<U256> {
    if contributed > reserve_after {
        return Err(AmmError::InvariantViolation(
            "single-asset contribution exceeds the reserve it was added to",
        ));
    }
    if decay.is_zero() || decay_change > decay {
        return Err(AmmError::InvariantViolation(
            "decay change is not a fraction of the decay",
        ));
    }

    let reserve_share = w_div(contributed, reserve_after)?;
    let decay_resolved = w_div(decay_change, decay)?;
    let gamma = w_mul(reserve_share, decay_resolved)? / 2;
    if gamma >= WAD {
        return Err(AmmError::InvariantViolation("issuance multiplier reached one"));
    }
    trace!(%reserve_share, %decay_resolved, %gamma, "Single-asset issuance multiplier");

    mul_div(claim_supply, gamma, WAD - gamma)
}

/// Decay amount for a single-asset entry, or `NoDecayPresent` when it is not
/// both of the expected kind and actionable
fn actionable_decay(ledger: &Ledger, actual_quote: U256, expected: DecayKind) -> AmmResult<U256> {
    let decay = ledger.detect_decay(actual_quote);
    if decay.kind() != Some(expected) || !ledger.is_sufficient_decay(actual_quote)? {
        return Err(AmmError::NoDecayPresent { expected });
    }
    Ok(decay.amount())
}

fn check_minimum(computed: U256, minimum: U256, asset: Asset) -> AmmResult<()> {
    if computed < minimum {
        return Err(AmmError::SlippageExceeded {
            asset,
            computed,
            minimum,
        });
    }
    Ok(())
}

/// Resolve quote-excess decay with base. Updates the ledger: the resolved
/// quote decay is absorbed into the quote reserve alongside the new base.
fn base_only_entry(
    desired_base: U256,
    min_base: U256,
    actual_quote: U256,
    claim_supply: U256,
    ledger: &mut Ledger,
) -> AmmResult<(U256, U256)> {
    if desired_base.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Base });
    }
    let quote_decay = actionable_decay(ledger, actual_quote, DecayKind::QuoteExcess)?;

    let quote_reserve = ledger.quote_reserve();
    let base_reserve = ledger.base_reserve();
    let max_base = mul_div_round(quote_decay, base_reserve, quote_reserve)?;
    let base_used = desired_base.min(max_base);
    check_minimum(base_used, min_base, Asset::Base)?;

    // Same rounding both ways so a full resolution lands on zero decay.
    // Clamped so the excess can never flip into a deficit.
    let quote_decay_change =
        mul_div_round(base_used, quote_reserve, base_reserve)?.min(quote_decay);
    if quote_decay_change.is_zero() {
        return Err(AmmError::DecayResolutionTooSmall {
            asset: Asset::Base,
            offered: base_used,
        });
    }

    ledger.apply_delta(Delta::Credit(quote_decay_change), Delta::Credit(base_used))?;

    let claim = single_asset_claim(
        claim_supply,
        base_used,
        ledger.base_reserve(),
        quote_decay_change,
        quote_decay,
    )?;
    Ok((base_used, claim))
}

/// Resolve quote-deficit decay with quote. The tracked reserves already
/// account for the missing quote, so the ledger is unchanged.
fn quote_only_entry(
    desired_quote: U256,
    min_quote: U256,
    actual_quote: U256,
    claim_supply: U256,
    ledger: &Ledger,
) -> AmmResult<(U256, U256)> {
    if desired_quote.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Quote });
    }
    let max_quote = actionable_decay(ledger, actual_quote, DecayKind::QuoteDeficit)?;

    let quote_used = desired_quote.min(max_quote);
    check_minimum(quote_used, min_quote, Asset::Quote)?;

    let to_base =
        |quote: U256| mul_div_round(quote, ledger.base_reserve(), ledger.quote_reserve());
    let base_decay_change = to_base(quote_used)?;
    if base_decay_change.is_zero() {
        return Err(AmmError::DecayResolutionTooSmall {
            asset: Asset::Quote,
            offered: quote_used,
        });
    }
    // The whole deficit priced in base, rounded the same way as its change
    let base_decay = to_base(max_quote)?;

    let claim = single_asset_claim(
        claim_supply,
        quote_used,
        ledger.quote_reserve(),
        base_decay_change,
        base_decay,
    )?;
    Ok((quote_used, claim))
}

/// Add both assets at the current reserve ratio
fn double_asset_entry(
    params: AddLiquidityParams,
    base_balance: U256,
    claim_supply: U256,
    bad_ratio: BadRatioPolicy,
    ledger: &mut Ledger,
) -> AmmResult<Contribution> {
    if params.desired_quote.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Quote });
    }
    if params.desired_base.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Base });
    }
    let quote_reserve = ledger.quote_reserve();
    let base_reserve = ledger.base_reserve();
    if quote_reserve.is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Quote });
    }
    if base_reserve.is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Base });
    }

    let required_quote = mul_div(params.desired_base, quote_reserve, base_reserve)?;
    let (quote, base) = if required_quote <= params.desired_quote {
        (required_quote, params.desired_base)
    } else {
        let required_base = mul_div(params.desired_quote, base_reserve, quote_reserve)?;
        if required_base > params.desired_base {
            return Err(AmmError::InvariantViolation(
                "both ratio directions exceed the desired quantities",
            ));
        }
        (params.desired_quote, required_base)
    };

    if quote.is_zero() || base.is_zero() {
        return match bad_ratio {
            BadRatioPolicy::Fail => Err(AmmError::BadRatio {
                desired_quote: params.desired_quote,
                desired_base: params.desired_base,
            }),
            BadRatioPolicy::ReturnZero => Ok(Contribution::default()),
        };
    }
    check_minimum(quote, params.min_quote, Asset::Quote)?;
    check_minimum(base, params.min_base, Asset::Base)?;

    let claim = double_asset_claim(base, claim_supply, base_balance)?;
    ledger.apply_delta(Delta::Credit(quote), Delta::Credit(base))?;
    Ok(Contribution { quote, base, claim })
}

/// First contribution: sets the price and issues claims 1:1 with base
fn seed_entry(params: AddLiquidityParams, ledger: &mut Ledger) -> AmmResult<Contribution> {
    if !ledger.is_empty() {
        return Err(AmmError::InvariantViolation(
            "claim supply is zero while reserves are still tracked",
        ));
    }
    if params.desired_quote.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Quote });
    }
    if params.desired_base.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: Asset::Base });
    }
    check_minimum(params.desired_quote, params.min_quote, Asset::Quote)?;
    check_minimum(params.desired_base, params.min_base, Asset::Base)?;

    ledger.seed(params.desired_quote, params.desired_base);
    Ok(Contribution {
        quote: params.desired_quote,
        base: params.desired_base,
        claim: params.desired_base,
    })
}

/// Resolve decay with the matching asset, then add the remainder as a pair
fn combined_entry(
    params: AddLiquidityParams,
    actual_quote: U256,
    actual_base: U256,
    claim_supply: U256,
    decay: DecayState,
    ledger: &mut Ledger,
) -> AmmResult<Contribution> {
    // Minimums apply to the totals, not to the decay-resolving step
    let resolved = match decay {
        DecayState::QuoteExcess(_) => {
            let (base, claim) =
                base_only_entry(params.desired_base, U256::zero(), actual_quote, claim_supply, ledger)?;
            Contribution {
                quote: U256::zero(),
                base,
                claim,
            }
        }
        DecayState::QuoteDeficit(_) => {
            let (quote, claim) =
                quote_only_entry(params.desired_quote, U256::zero(), actual_quote, claim_supply, ledger)?;
            Contribution {
                quote,
                base: U256::zero(),
                claim,
            }
        }
        DecayState::None => {
            return Err(AmmError::InvariantViolation("combined entry without decay"));
        }
    };

    let leftover = AddLiquidityParams {
        desired_quote: params.desired_quote.saturating_sub(resolved.quote),
        desired_base: params.desired_base.saturating_sub(resolved.base),
        min_quote: U256::zero(),
        min_base: U256::zero(),
    };

    let paired = if leftover.desired_quote.is_zero() || leftover.desired_base.is_zero() {
        Contribution::default()
    } else {
        // The base resolving the decay is part of the balance once transferred
        double_asset_entry(
            leftover,
            checked_add(actual_base, resolved.base, "base balance")?,
            checked_add(claim_supply, resolved.claim, "claim supply")?,
            BadRatioPolicy::ReturnZero,
            ledger,
        )?
    };

    let total = Contribution {
        quote: checked_add(resolved.quote, paired.quote, "quote used")?,
        base: checked_add(resolved.base, paired.base, "base used")?,
        claim: checked_add(resolved.claim, paired.claim, "claim issued")?,
    };
    check_minimum(total.quote, params.min_quote, Asset::Quote)?;
    check_minimum(total.base, params.min_base, Asset::Base)?;

    let quote_unconsumed = params.desired_quote.saturating_sub(total.quote);
    let base_unconsumed = params.desired_base.saturating_sub(total.base);
    if !quote_unconsumed.is_zero() || !base_unconsumed.is_zero() {
        warn!(
            quote_unconsumed = %quote_unconsumed,
            base_unconsumed = %base_unconsumed,
            "Combined entry left offered quantities unconsumed"
        );
    }
    Ok(total)
}

/// Add liquidity with both assets, resolving actionable decay first
///
/// The first contribution to an empty pair seeds the price. Afterwards,
/// decay below the actionable threshold allows a plain double-asset entry;
/// actionable decay routes through a combined entry. Offered quantities the
/// pair does not take are reported in the outcome.
pub fn compute_add_liquidity(
    params: AddLiquidityParams,
    actual_quote: U256,
    actual_base: U256,
    claim_supply: U256,
    bad_ratio: BadRatioPolicy,
    protocol_fee: ProtocolFee,
    ledger: &mut Ledger,
) -> AmmResult<AddLiquidityOutcome> {
    let mut scratch = *ledger;

    let (contribution, protocol_fee_claim) = if claim_supply.is_zero() {
        (seed_entry(params, &mut scratch)?, U256::zero())
    } else {
        let fee_claim = protocol_fee.accrued_claim(claim_supply, &scratch)?;
        let supply = checked_add(claim_supply, fee_claim, "claim supply")?;
        let decay = scratch.detect_decay(actual_quote);

        let contribution = if scratch.is_sufficient_decay(actual_quote)? {
            combined_entry(params, actual_quote, actual_base, supply, decay, &mut scratch)?
        } else {
            if decay != DecayState::None {
                warn!(
                    decay = %decay.amount(),
                    "Decay below actionable threshold, adding at the tracked ratio"
                );
            }
            double_asset_entry(params, actual_base, supply, bad_ratio, &mut scratch)?
        };
        (contribution, fee_claim)
    };

    scratch.record_invariant()?;
    *ledger = scratch;

    let outcome = AddLiquidityOutcome {
        quote_used: contribution.quote,
        base_used: contribution.base,
        claim_issued: contribution.claim,
        protocol_fee_claim,
        quote_unconsumed: params.desired_quote.saturating_sub(contribution.quote),
        base_unconsumed: params.desired_base.saturating_sub(contribution.base),
    };
    debug!(
        quote_used = %outcome.quote_used,
        base_used = %outcome.base_used,
        claim_issued = %outcome.claim_issued,
        quote_unconsumed = %outcome.quote_unconsumed,
        base_unconsumed = %outcome.base_unconsumed,
        quote_reserve = %ledger.quote_reserve(),
        base_reserve = %ledger.base_reserve(),
        "Liquidity added"
    );
    Ok(outcome)
}

fn require_existing_supply(claim_supply: U256) -> AmmResult<()> {
    if claim_supply.is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Claim });
    }
    Ok(())
}

/// Add quote only, resolving quote-deficit decay
pub fn compute_add_quote_only_liquidity(
    desired_quote: U256,
    min_quote: U256,
    actual_quote: U256,
    claim_supply: U256,
    protocol_fee: ProtocolFee,
    ledger: &mut Ledger,
) -> AmmResult<SingleAssetOutcome> {
    require_existing_supply(claim_supply)?;
    let mut scratch = *ledger;

    let protocol_fee_claim = protocol_fee.accrued_claim(claim_supply, &scratch)?;
    let supply = checked_add(claim_supply, protocol_fee_claim, "claim supply")?;
    let (used, claim_issued) = quote_only_entry(desired_quote, min_quote, actual_quote, supply, &scratch)?;

    scratch.record_invariant()?;
    *ledger = scratch;

    debug!(%used, %claim_issued, "Quote-only liquidity added");
    Ok(SingleAssetOutcome {
        used,
        claim_issued,
        protocol_fee_claim,
    })
}

/// Add base only, resolving quote-excess decay
pub fn compute_add_base_only_liquidity(
    desired_base: U256,
    min_base: U256,
    actual_quote: U256,
    claim_supply: U256,
    protocol_fee: ProtocolFee,
    ledger: &mut Ledger,
) -> AmmResult<SingleAssetOutcome> {
    require_existing_supply(claim_supply)?;
    let mut scratch = *ledger;

    let protocol_fee_claim = protocol_fee.accrued_claim(claim_supply, &scratch)?;
    let supply = checked_add(claim_supply, protocol_fee_claim, "claim supply")?;
    let (used, claim_issued) =
        base_only_entry(desired_base, min_base, actual_quote, supply, &mut scratch)?;

    scratch.record_invariant()?;
    *ledger = scratch;

    debug!(
        %used,
        %claim_issued,
        quote_reserve = %ledger.quote_reserve(),
        base_reserve = %ledger.base_reserve(),
        "Base-only liquidity added"
    );
    Ok(SingleAssetOutcome {
        used,
        claim_issued,
        protocol_fee_claim,
    })
}
