//! Pool trait definitions for the host-side balance view

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// Externally observed state of a pair, read fresh at the start of every operation
pub trait PoolBalances {
    /// Quote asset held by the pair, including any rebase since the last operation
    fn actual_quote(&self) -> U256;

    /// Base asset held by the pair
    fn actual_base(&self) -> U256;

    /// Outstanding liquidity-claim tokens
    fn claim_supply(&self) -> U256;
}

/// Balances captured at a single point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub actual_quote: U256,
    pub actual_base: U256,
    pub claim_supply: U256,
}

impl BalanceSnapshot {
    pub fn new(actual_quote: U256, actual_base: U256, claim_supply: U256) -> Self {
        Self {
            actual_quote,
            actual_base,
            claim_supply,
        }
    }
}

impl PoolBalances for BalanceSnapshot {
    fn actual_quote(&self) -> U256 {
        self.actual_quote
    }

    fn actual_base(&self) -> U256 {
        self.actual_base
    }

    fn claim_supply(&self) -> U256 {
        self.claim_supply
    }
}
