//! Single-pair facade over the ledger
//!
//! `ElasticPair` owns its ledger exclusively and exposes every operation as a
//! `&mut self` method, so only one write path to the reserves exists at a
//! time. Actual balances and claim supply are read from a [`PoolBalances`]
//! source on every call; the pair never caches them across operations.
//!
//! The pair only computes quantities. Moving assets and minting or burning
//! claim tokens according to the returned outcomes is up to the host.

use crate::errors::{AmmError, AmmResult};
use crate::ledger::{DecayState, Ledger};
use crate::liquidity::{
    compute_add_base_only_liquidity, compute_add_liquidity, compute_add_quote_only_liquidity,
    AddLiquidityOutcome, AddLiquidityParams, SingleAssetOutcome,
};
use crate::pool_traits::PoolBalances;
use crate::protocol_fee::ProtocolFee;
use crate::redemption::{compute_remove_liquidity, RedemptionOutcome, RemoveLiquidityParams};
use crate::swap::{
    compute_swap_base_for_quote, compute_swap_quote_for_base, quote_base_out, quote_quote_out,
};
use elastic_config::{PairConfig, BASIS_POINTS};
use ethereum_types::U256;
use rust_decimal::Decimal;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ElasticPair {
    ledger: Ledger,
    config: PairConfig,
    protocol_fee: ProtocolFee,
}

impl ElasticPair {
    /// New pair with an empty ledger
    pub fn new(config: PairConfig) -> AmmResult<Self> {
        Self::with_ledger(config, Ledger::new())
    }

    /// Resume a pair from a persisted ledger
    pub fn with_ledger(config: PairConfig, ledger: Ledger) -> AmmResult<Self> {
        if config.fee_bps >= BASIS_POINTS {
            return Err(AmmError::InvalidFee {
                fee_bps: config.fee_bps,
            });
        }
        let protocol_fee = ProtocolFee::from(&config);
        info!(
            fee_bps = config.fee_bps,
            protocol_fee = protocol_fee.is_enabled(),
            bad_ratio = ?config.bad_ratio,
            "Elastic pair initialized"
        );
        Ok(Self {
            ledger,
            config,
            protocol_fee,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &PairConfig {
        &self.config
    }

    pub fn add_liquidity(
        &mut self,
        params: AddLiquidityParams,
        balances: &dyn PoolBalances,
    ) -> AmmResult<AddLiquidityOutcome> {
        compute_add_liquidity(
            params,
            balances.actual_quote(),
            balances.actual_base(),
            balances.claim_supply(),
            self.config.bad_ratio,
            self.protocol_fee,
            &mut self.ledger,
        )
    }

    pub fn add_quote_only_liquidity(
        &mut self,
        desired_quote: U256,
        min_quote: U256,
        balances: &dyn PoolBalances,
    ) -> AmmResult<SingleAssetOutcome> {
        compute_add_quote_only_liquidity(
            desired_quote,
            min_quote,
            balances.actual_quote(),
            balances.claim_supply(),
            self.protocol_fee,
            &mut self.ledger,
        )
    }

    pub fn add_base_only_liquidity(
        &mut self,
        desired_base: U256,
        min_base: U256,
        balances: &dyn PoolBalances,
    ) -> AmmResult<SingleAssetOutcome> {
        compute_add_base_only_liquidity(
            desired_base,
            min_base,
            balances.actual_quote(),
            balances.claim_supply(),
            self.protocol_fee,
            &mut self.ledger,
        )
    }

    pub fn swap_quote_for_base(&mut self, quote_in: U256, min_base_out: U256) -> AmmResult<U256> {
        compute_swap_quote_for_base(quote_in, min_base_out, self.config.fee_bps, &mut self.ledger)
    }

    pub fn swap_base_for_quote(
        &mut self,
        base_in: U256,
        min_quote_out: U256,
        balances: &dyn PoolBalances,
    ) -> AmmResult<U256> {
        compute_swap_base_for_quote(
            base_in,
            min_quote_out,
            balances.actual_quote(),
            self.config.fee_bps,
            &mut self.ledger,
        )
    }

    pub fn remove_liquidity(
        &mut self,
        params: RemoveLiquidityParams,
        balances: &dyn PoolBalances,
    ) -> AmmResult<RedemptionOutcome> {
        compute_remove_liquidity(
            params,
            balances.actual_quote(),
            balances.actual_base(),
            balances.claim_supply(),
            self.protocol_fee,
            &mut self.ledger,
        )
    }

    /// Base a swap of `quote_in` would pay out right now
    pub fn quote_swap_quote_for_base(&self, quote_in: U256) -> AmmResult<U256> {
        quote_base_out(quote_in, self.config.fee_bps, &self.ledger)
    }

    /// Quote a swap of `base_in` would pay out right now
    pub fn quote_swap_base_for_quote(
        &self,
        base_in: U256,
        balances: &dyn PoolBalances,
    ) -> AmmResult<U256> {
        quote_quote_out(base_in, balances.actual_quote(), self.config.fee_bps, &self.ledger)
    }

    pub fn decay_state(&self, balances: &dyn PoolBalances) -> DecayState {
        self.ledger.detect_decay(balances.actual_quote())
    }

    /// Quote per base at the tracked reserves
    pub fn spot_price(&self) -> Option<Decimal> {
        self.ledger.spot_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool_traits::BalanceSnapshot;
    use elastic_config::ProtocolFeeConfig;

    fn e(exp: usize) -> U256 {
        U256::exp10(exp)
    }

    /// Host side of a pair: external balances and claim-token supply
    #[derive(Debug, Default)]
    struct Host {
        balances: BalanceSnapshot,
    }

    impl Host {
        fn deposit(&mut self, quote: U256, base: U256, minted: U256) {
            self.balances.actual_quote += quote;
            self.balances.actual_base += base;
            self.balances.claim_supply += minted;
        }

        fn withdraw(&mut self, quote: U256, base: U256, burned: U256) {
            self.balances.actual_quote -= quote;
            self.balances.actual_base -= base;
            self.balances.claim_supply -= burned;
        }

        fn rebase(&mut self, quote: U256, expand: bool) {
            if expand {
                self.balances.actual_quote += quote;
            } else {
                self.balances.actual_quote -= quote;
            }
        }
    }

    fn seeded_pair(config: PairConfig, host: &mut Host) -> ElasticPair {
        let mut pair = ElasticPair::new(config).unwrap();
        let outcome = pair
            .add_liquidity(
                AddLiquidityParams {
                    desired_quote: e(24),
                    desired_base: e(24),
                    ..AddLiquidityParams::default()
                },
                &host.balances,
            )
            .unwrap();
        host.deposit(outcome.quote_used, outcome.base_used, outcome.claim_issued);
        pair
    }

    #[test]
    fn test_rejects_full_fee() {
        let config = PairConfig {
            fee_bps: BASIS_POINTS,
            ..PairConfig::default()
        };
        assert_eq!(
            ElasticPair::new(config).unwrap_err(),
            AmmError::InvalidFee { fee_bps: 10_000 }
        );
    }

    #[test]
    fn test_lifecycle_with_expansion() {
        let mut host = Host::default();
        let mut pair = seeded_pair(PairConfig::default(), &mut host);
        assert_eq!(host.balances.claim_supply, e(24));

        let quoted = pair.quote_swap_quote_for_base(e(21)).unwrap();
        let base_out = pair.swap_quote_for_base(e(21), quoted).unwrap();
        assert_eq!(base_out, quoted);
        host.deposit(e(21), U256::zero(), U256::zero());
        host.withdraw(U256::zero(), base_out, U256::zero());
        assert_eq!(pair.decay_state(&host.balances), DecayState::None);

        host.rebase(e(22), true);
        assert_eq!(
            pair.decay_state(&host.balances),
            DecayState::QuoteExcess(e(22))
        );

        let resolved = pair
            .add_base_only_liquidity(e(23), U256::zero(), &host.balances)
            .unwrap();
        assert!(resolved.used < e(23));
        host.deposit(U256::zero(), resolved.used, resolved.claim_issued);
        assert!(pair.decay_state(&host.balances).amount() <= U256::one());

        // Redeeming everything pays out exactly what the pair holds
        let all = host.balances.claim_supply;
        let redeemed = pair
            .remove_liquidity(
                RemoveLiquidityParams {
                    claim_qty: all,
                    ..RemoveLiquidityParams::default()
                },
                &host.balances,
            )
            .unwrap();
        assert_eq!(redeemed.quote_out, host.balances.actual_quote);
        assert_eq!(redeemed.base_out, host.balances.actual_base);
        assert!(pair.ledger().is_empty());
    }

    #[test]
    fn test_contraction_prices_quote_out_lower() {
        let mut host = Host::default();
        let mut pair = seeded_pair(PairConfig::default(), &mut host);
        let before = pair.quote_swap_base_for_quote(e(21), &host.balances).unwrap();

        host.rebase(e(23), false);
        let after = pair.quote_swap_base_for_quote(e(21), &host.balances).unwrap();
        assert!(after < before);

        let quote_out = pair
            .swap_base_for_quote(e(21), U256::zero(), &host.balances)
            .unwrap();
        assert_eq!(quote_out, after);
        assert_eq!(pair.ledger().quote_reserve(), e(24) - quote_out);

        // The deficit is still there to be resolved with quote
        host.withdraw(quote_out, U256::zero(), U256::zero());
        host.deposit(U256::zero(), e(21), U256::zero());
        let resolved = pair
            .add_quote_only_liquidity(e(24), U256::zero(), &host.balances)
            .unwrap();
        assert_eq!(resolved.used, e(23));
        host.deposit(resolved.used, U256::zero(), resolved.claim_issued);
        assert_eq!(pair.decay_state(&host.balances), DecayState::None);
    }

    #[test]
    fn test_protocol_fee_accrues_from_swap_growth() {
        let config = PairConfig {
            protocol_fee: ProtocolFeeConfig {
                enabled: true,
                share_denominator: 6,
            },
            ..PairConfig::default()
        };
        let mut host = Host::default();
        let mut pair = seeded_pair(config, &mut host);

        for _ in 0..10 {
            let out = pair.swap_quote_for_base(e(22), U256::zero()).unwrap();
            host.deposit(e(22), U256::zero(), U256::zero());
            host.withdraw(U256::zero(), out, U256::zero());
            let back = pair
                .swap_base_for_quote(out, U256::zero(), &host.balances)
                .unwrap();
            host.deposit(U256::zero(), out, U256::zero());
            host.withdraw(back, U256::zero(), U256::zero());
        }
        assert!(pair.ledger().invariant().unwrap() > pair.ledger().invariant_last());

        let outcome = pair
            .add_liquidity(
                AddLiquidityParams {
                    desired_quote: e(22),
                    desired_base: e(22),
                    ..AddLiquidityParams::default()
                },
                &host.balances,
            )
            .unwrap();
        assert!(outcome.protocol_fee_claim > U256::zero());
        assert_eq!(
            pair.ledger().invariant_last(),
            pair.ledger().invariant().unwrap()
        );
    }

    #[test]
    fn test_decay_state_reads_fresh_balances() {
        let ledger = Ledger::from_parts(e(24), e(24), e(48));
        let pair = ElasticPair::with_ledger(PairConfig::default(), ledger).unwrap();

        let expanded = BalanceSnapshot::new(e(24) + e(20), e(24), e(24));
        let contracted = BalanceSnapshot::new(e(24) - e(20), e(24), e(24));
        assert_eq!(pair.decay_state(&expanded), DecayState::QuoteExcess(e(20)));
        assert_eq!(pair.decay_state(&contracted), DecayState::QuoteDeficit(e(20)));

        // Excess does not change what base buys, a deficit makes quote dearer
        let tracked = BalanceSnapshot::new(e(24), e(24), e(24));
        let baseline = pair.quote_swap_base_for_quote(e(20), &tracked).unwrap();
        assert_eq!(pair.quote_swap_base_for_quote(e(20), &expanded).unwrap(), baseline);
        assert!(pair.quote_swap_base_for_quote(e(20), &contracted).unwrap() < baseline);
    }

    #[test]
    fn test_spot_price_follows_seed() {
        let mut host = Host::default();
        let mut pair = ElasticPair::new(PairConfig::default()).unwrap();
        assert_eq!(pair.spot_price(), None);

        let outcome = pair
            .add_liquidity(
                AddLiquidityParams {
                    desired_quote: e(21) * 3,
                    desired_base: e(21) * 2,
                    ..AddLiquidityParams::default()
                },
                &host.balances,
            )
            .unwrap();
        host.deposit(outcome.quote_used, outcome.base_used, outcome.claim_issued);
        assert_eq!(pair.spot_price(), Some(Decimal::new(15, 1)));
    }
}
