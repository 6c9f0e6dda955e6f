use cura_ledger::Ledger;
use cura_types::{AccountId, Clock, Numeric};

use crate::book::DepositBook;
use crate::error::Result;
use crate::secondary::ClaimPayout;
use crate::snapshot::PrimaryPoolSnapshot;

/// Shared components a pool operation reads or mutates.
///
/// The clock and the reserve ledger live outside the pool; they are lent to
/// each operation instead of being stored.
pub struct PoolEnv<'a> {
    pub clock: &'a Clock,
    pub reserve: &'a mut Ledger,
}

impl<'a> PoolEnv<'a> {
    pub fn new(clock: &'a Clock, reserve: &'a mut Ledger) -> Self {
        Self { clock, reserve }
    }
}

/// Capability interface of a primary curation pool.
///
/// Every mutating operation takes `&mut self`: one pool instance is one
/// exclusion domain. Settlement reads and writes `acc_royalties_per_share`
/// and the secondary pool's deposit total, so interleaved callers would lose
/// updates.
pub trait PrimaryPool: DepositBook {
    /// Lock `amount` of the account's reserve tokens in the pool.
    fn deposit(&mut self, env: &mut PoolEnv<'_>, account: &AccountId, amount: Numeric)
        -> Result<()>;

    /// Return `amount` of the account's recorded deposit.
    fn withdraw(&mut self, env: &mut PoolEnv<'_>, account: &AccountId, amount: Numeric)
        -> Result<()>;

    /// Mint `shares` to `account` at the dilution price. Returns the reserve
    /// cost actually paid.
    fn buy_shares(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
        shares: Numeric,
    ) -> Result<Numeric>;

    /// Settle the account's secondary-pool position.
    fn claim(&mut self, env: &mut PoolEnv<'_>, account: &AccountId) -> Result<ClaimPayout>;

    /// Credit `royalties` to every share, materialized or not.
    fn distribute_royalties(&mut self, clock: &Clock, royalties: Numeric) -> Result<()>;

    /// Materialize the virtual issuance since the last mint. Returns the
    /// number of shares minted.
    fn mint_shares(&mut self, env: &mut PoolEnv<'_>) -> Result<Numeric>;

    /// Stored or default snapshot of `account`.
    fn snapshot_of(&self, account: &AccountId) -> PrimaryPoolSnapshot;
}
