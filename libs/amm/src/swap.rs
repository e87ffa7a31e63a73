//! Constant-product swap pricing with input fees and decay adjustment
//!
//! The fee is taken out of the input before pricing, so every fee-bearing
//! trade strictly grows `quoteReserve * baseReserve`. When the quote asset has
//! contracted below its tracked reserve, trades that pay out quote are priced
//! against a curve implied by the actual quote balance at the internal ratio,
//! so the stale reserve cannot be drained at the pre-contraction price.

use crate::errors::{AmmError, AmmResult};
use crate::fixed_point::{checked_add, checked_mul, less_fee_scaled, mul_div, mul_div_ceil};
use crate::ledger::{Asset, DecayState, Delta, Ledger};
use elastic_config::BASIS_POINTS;
use ethereum_types::U256;
use tracing::{debug, trace};

/// Output for `input_qty` against the given reserves after fees
///
/// `in*(10000-fee) * outReserve / (inReserve*10000 + in*(10000-fee))`
pub fn price_after_fee(
    input_qty: U256,
    input_reserve: U256,
    output_reserve: U256,
    fee_bps: u32,
) -> AmmResult<U256> {
    let input_less_fee = less_fee_scaled(input_qty, fee_bps)?;
    let denominator = checked_add(
        checked_mul(input_reserve, U256::from(BASIS_POINTS), "swap denominator")?,
        input_less_fee,
        "swap denominator",
    )?;
    mul_div(input_less_fee, output_reserve, denominator)
}

fn validate_swap(input_qty: U256, input: Asset, fee_bps: u32, ledger: &Ledger) -> AmmResult<()> {
    if fee_bps >= BASIS_POINTS {
        return Err(AmmError::InvalidFee { fee_bps });
    }
    if input_qty.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset: input });
    }
    if ledger.quote_reserve().is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Quote });
    }
    if ledger.base_reserve().is_zero() {
        return Err(AmmError::InsufficientLiquidity { asset: Asset::Base });
    }
    Ok(())
}

fn check_output(computed: U256, minimum: U256, asset: Asset) -> AmmResult<()> {
    if computed.is_zero() {
        return Err(AmmError::InsufficientQuantity { asset });
    }
    if computed < minimum {
        return Err(AmmError::SlippageExceeded {
            asset,
            computed,
            minimum,
        });
    }
    Ok(())
}

/// Base paid out for `quote_in`, without touching the ledger
pub fn quote_base_out(quote_in: U256, fee_bps: u32, ledger: &Ledger) -> AmmResult<U256> {
    validate_swap(quote_in, Asset::Quote, fee_bps, ledger)?;
    price_after_fee(quote_in, ledger.quote_reserve(), ledger.base_reserve(), fee_bps)
}

/// Quote paid out for `base_in`, without touching the ledger
pub fn quote_quote_out(
    base_in: U256,
    actual_quote: U256,
    fee_bps: u32,
    ledger: &Ledger,
) -> AmmResult<U256> {
    validate_swap(base_in, Asset::Base, fee_bps, ledger)?;
    match ledger.detect_decay(actual_quote) {
        DecayState::QuoteDeficit(_) => {
            if actual_quote.is_zero() {
                return Err(AmmError::InsufficientLiquidity { asset: Asset::Quote });
            }
            // Base reserve implied by the actual quote balance at the internal
            // ratio, rounded up so the contracted curve is never understated
            let implied_base =
                mul_div_ceil(actual_quote, ledger.base_reserve(), ledger.quote_reserve())?;
            trace!(%implied_base, %actual_quote, "Pricing against contracted quote curve");
            price_after_fee(base_in, implied_base, actual_quote, fee_bps)
        }
        DecayState::None | DecayState::QuoteExcess(_) => {
            price_after_fee(base_in, ledger.base_reserve(), ledger.quote_reserve(), fee_bps)
        }
    }
}

/// Sell `quote_in` for base, updating the ledger
pub fn compute_swap_quote_for_base(
    quote_in: U256,
    min_base_out: U256,
    fee_bps: u32,
    ledger: &mut Ledger,
) -> AmmResult<U256> {
    let base_out = quote_base_out(quote_in, fee_bps, ledger)?;
    check_output(base_out, min_base_out, Asset::Base)?;

    let mut scratch = *ledger;
    scratch.apply_delta(Delta::Credit(quote_in), Delta::Debit(base_out))?;
    *ledger = scratch;

    debug!(
        %quote_in,
        %base_out,
        quote_reserve = %ledger.quote_reserve(),
        base_reserve = %ledger.base_reserve(),
        "Swapped quote for base"
    );
    Ok(base_out)
}

/// Sell `base_in` for quote, updating the ledger
pub fn compute_swap_base_for_quote(
    base_in: U256,
    min_quote_out: U256,
    actual_quote: U256,
    fee_bps: u32,
    ledger: &mut Ledger,
) -> AmmResult<U256> {
    let quote_out = quote_quote_out(base_in, actual_quote, fee_bps, ledger)?;
    check_output(quote_out, min_quote_out, Asset::Quote)?;

    let mut scratch = *ledger;
    scratch.apply_delta(Delta::Debit(quote_out), Delta::Credit(base_in))?;
    *ledger = scratch;

    debug!(
        %base_in,
        %quote_out,
        quote_reserve = %ledger.quote_reserve(),
        base_reserve = %ledger.base_reserve(),
        "Swapped base for quote"
    );
    Ok(quote_out)
}
