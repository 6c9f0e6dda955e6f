use std::collections::BTreeMap;

use cura_types::{AccountId, Numeric};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::book::DepositBook;
use crate::error::{PoolError, Result};
use crate::snapshot::SecondaryPoolSnapshot;

/// What the secondary pool did with freshly minted shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareDistribution {
    /// Credited to depositors through the per-deposit accumulator.
    Accrued,
    /// Nobody is deposited; the owning pool must burn the shares.
    Burn,
}

/// Shares and royalties paid out by a secondary-pool claim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimPayout {
    pub shares: Numeric,
    pub royalties: Numeric,
}

impl ClaimPayout {
    pub fn is_empty(&self) -> bool {
        self.shares == 0.0 && self.royalties == 0.0
    }
}

/// Deposit-weighted distributor of primary-pool shares and royalties.
///
/// Two global accumulators grow with every distribution; an account's
/// entitlement since its last settlement is the accumulator delta times the
/// deposit recorded in its snapshot. Token balances live in the owning
/// pool's ledgers at [`SecondaryPool::address`]; this type only keeps the
/// accounting.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryPool {
    address: AccountId,
    snapshots: BTreeMap<AccountId, SecondaryPoolSnapshot>,
    acc_shares_per_deposit: Numeric,
    acc_royalties_per_deposit: Numeric,
    total_deposits: Numeric,
    stranded_royalties: Numeric,
}

impl SecondaryPool {
    pub fn new(address: AccountId, total_deposits: Numeric) -> Self {
        Self {
            address,
            snapshots: BTreeMap::new(),
            acc_shares_per_deposit: 0.0,
            acc_royalties_per_deposit: 0.0,
            total_deposits,
            stranded_royalties: 0.0,
        }
    }

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn acc_shares_per_deposit(&self) -> Numeric {
        self.acc_shares_per_deposit
    }

    pub fn acc_royalties_per_deposit(&self) -> Numeric {
        self.acc_royalties_per_deposit
    }

    pub fn total_deposits(&self) -> Numeric {
        self.total_deposits
    }

    pub fn has_depositors(&self) -> bool {
        self.total_deposits > 0.0
    }

    /// Royalties received while no deposits existed. They sit at the
    /// secondary pool address and are never credited to anyone.
    pub fn stranded_royalties(&self) -> Numeric {
        self.stranded_royalties
    }

    pub fn stored_snapshot(&self, account: &AccountId) -> Option<&SecondaryPoolSnapshot> {
        self.snapshots.get(account)
    }

    /// Stored snapshot, or a synthesized one for an unsettled account.
    ///
    /// An account with a recorded deposit but no snapshot is a genesis
    /// depositor and integrates from zero accumulators. Anyone else starts
    /// with no weight at the current accumulators, so a later deposit
    /// accrues only from then on.
    pub fn snapshot_of(
        &self,
        book: &dyn DepositBook,
        account: &AccountId,
    ) -> SecondaryPoolSnapshot {
        if let Some(snapshot) = self.snapshots.get(account) {
            return *snapshot;
        }
        let deposit = book.deposit_of(account);
        if deposit > 0.0 {
            SecondaryPoolSnapshot {
                deposit,
                acc_shares_per_deposit: 0.0,
                acc_royalties_per_deposit: 0.0,
            }
        } else {
            SecondaryPoolSnapshot {
                deposit: 0.0,
                acc_shares_per_deposit: self.acc_shares_per_deposit,
                acc_royalties_per_deposit: self.acc_royalties_per_deposit,
            }
        }
    }

    /// Record a new deposit weight without paying out.
    ///
    /// The snapshot moves to the current accumulators, so whatever the old
    /// weight had earned since its last settlement is dropped. Callers claim
    /// first.
    pub(crate) fn update_deposit(
        &mut self,
        book: &dyn DepositBook,
        account: &AccountId,
        new_deposit: Numeric,
    ) {
        let previous = self.snapshot_of(book, account).deposit;
        self.snapshots.insert(
            account.clone(),
            SecondaryPoolSnapshot {
                deposit: new_deposit,
                acc_shares_per_deposit: self.acc_shares_per_deposit,
                acc_royalties_per_deposit: self.acc_royalties_per_deposit,
            },
        );
        self.total_deposits += new_deposit - previous;
        debug!(
            account = %account,
            previous,
            new_deposit,
            total_deposits = self.total_deposits,
            "secondary deposit updated"
        );
    }

    pub(crate) fn distribute_shares(&mut self, shares: Numeric) -> ShareDistribution {
        if self.has_depositors() {
            self.acc_shares_per_deposit += shares / self.total_deposits;
            debug!(shares, acc = self.acc_shares_per_deposit, "shares accrued");
            ShareDistribution::Accrued
        } else {
            debug!(shares, "no depositors; shares will be burned");
            ShareDistribution::Burn
        }
    }

    pub(crate) fn distribute_royalties(&mut self, royalties: Numeric) -> Result<()> {
        if !self.has_depositors() {
            return Err(PoolError::NoDepositors { royalties });
        }
        self.acc_royalties_per_deposit += royalties / self.total_deposits;
        debug!(royalties, acc = self.acc_royalties_per_deposit, "royalties accrued");
        Ok(())
    }

    pub(crate) fn strand_royalties(&mut self, royalties: Numeric) {
        self.stranded_royalties += royalties;
        warn!(
            royalties,
            stranded = self.stranded_royalties,
            "secondary pool received royalties with no deposits"
        );
    }

    /// Compute what `account` is owed and move its snapshot forward.
    ///
    /// Uses the deposit stored in the snapshot, not the current one. The
    /// caller moves the tokens.
    pub(crate) fn claim(&mut self, book: &dyn DepositBook, account: &AccountId) -> ClaimPayout {
        let previous = self.snapshot_of(book, account);
        let payout = ClaimPayout {
            shares: (self.acc_shares_per_deposit - previous.acc_shares_per_deposit)
                * previous.deposit,
            royalties: (self.acc_royalties_per_deposit - previous.acc_royalties_per_deposit)
                * previous.deposit,
        };
        self.snapshots.insert(
            account.clone(),
            SecondaryPoolSnapshot {
                deposit: previous.deposit,
                acc_shares_per_deposit: self.acc_shares_per_deposit,
                acc_royalties_per_deposit: self.acc_royalties_per_deposit,
            },
        );
        payout
    }
}
