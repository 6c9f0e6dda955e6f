use std::collections::BTreeMap;

use cura_types::{AccountId, Numeric};
use serde::{Deserialize, Serialize};

use crate::state::State;

/// Default per-record view of a [`State`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateProjection {
    pub block_height: u64,
    /// Virtual supply including issuance not yet minted.
    pub total_shares: Numeric,
    pub share_supply: Numeric,
    pub share_balances: BTreeMap<AccountId, Numeric>,
    pub deposits: BTreeMap<AccountId, Numeric>,
    /// Sum of recorded deposits in the primary pool.
    pub total_deposits: Numeric,
    /// Deposit weight the secondary pool distributes over.
    pub secondary_total_deposits: Numeric,
    pub reserve_balances: BTreeMap<AccountId, Numeric>,
}

impl StateProjection {
    pub fn capture(state: &State) -> Self {
        let pool = &state.pool;
        let shares = pool.share_ledger();
        Self {
            block_height: state.clock.block_height(),
            total_shares: pool.total_shares(&state.clock),
            share_supply: shares.total_supply(),
            share_balances: shares.balances().clone(),
            deposits: pool.deposits().as_map().clone(),
            total_deposits: pool.deposits().total(),
            secondary_total_deposits: pool.secondary().total_deposits(),
            reserve_balances: state.reserve.balances().clone(),
        }
    }

    pub fn shares_of(&self, account: &str) -> Numeric {
        self.share_balances.get(account).copied().unwrap_or(0.0)
    }

    pub fn reserve_of(&self, account: &str) -> Numeric {
        self.reserve_balances.get(account).copied().unwrap_or(0.0)
    }

    pub fn deposit_of(&self, account: &str) -> Numeric {
        self.deposits.get(account).copied().unwrap_or(0.0)
    }
}
