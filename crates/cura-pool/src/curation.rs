use std::collections::BTreeMap;

use cura_ledger::{Ledger, LedgerHooks, TransferReceipt};
use cura_types::{is_valid_amount, AccountId, Clock, Numeric, TRANSFER_EPSILON};
use tracing::{debug, info, warn};

use crate::book::{DepositBook, DepositRegistry};
use crate::config::{ensure_unique, PoolConfig, WithdrawOrder};
use crate::error::{PoolError, Result};
use crate::secondary::{ClaimPayout, SecondaryPool, ShareDistribution};
use crate::snapshot::PrimaryPoolSnapshot;
use crate::traits::{PoolEnv, PrimaryPool};

/// The primary curation pool.
///
/// Owns the share ledger, the deposit registry, and the secondary pool.
/// Shares accrue continuously at `issuance_rate` per block but are only
/// minted when a settlement needs the real supply to catch up with
/// [`CurationPool::total_shares`].
///
/// Every movement of share tokens goes through the settlement pair: both
/// sides settle their primary-pool royalties first, and their snapshots pick
/// up the new balances afterwards. An account holding shares without a
/// stored snapshot has therefore held them since genesis.
#[derive(Debug)]
pub struct CurationPool {
    config: PoolConfig,
    shares: Ledger,
    deposits: DepositRegistry,
    snapshots: BTreeMap<AccountId, PrimaryPoolSnapshot>,
    acc_royalties_per_share: Numeric,
    last_minted_block: u64,
    secondary: SecondaryPool,
}

impl CurationPool {
    /// Create a pool from genesis balances.
    ///
    /// The genesis deposits must sum exactly to the reserve balance already
    /// held at the pool address.
    pub fn new(
        config: PoolConfig,
        share_balances: &[(AccountId, Numeric)],
        initial_deposits: &[(AccountId, Numeric)],
        reserve: &Ledger,
        clock: &Clock,
    ) -> Result<Self> {
        config.validate()?;
        ensure_unique(initial_deposits, "deposit")?;
        if let Some((account, amount)) = initial_deposits
            .iter()
            .find(|(_, amount)| !is_valid_amount(*amount))
        {
            return Err(PoolError::Configuration(format!(
                "genesis deposit of {account} is invalid: {amount}"
            )));
        }

        let deposited: Numeric = initial_deposits.iter().map(|(_, amount)| amount).sum();
        let held = reserve.balance_of(&config.address);
        if deposited != held {
            return Err(PoolError::Configuration(format!(
                "deposit balances sum to {deposited} but {} holds {held}",
                config.address
            )));
        }

        let secondary = SecondaryPool::new(config.secondary_address.clone(), held);
        info!(
            pool = %config.address,
            deposits = deposited,
            issuance_rate = config.issuance_rate,
            "curation pool created"
        );

        Ok(Self {
            shares: Ledger::with_balances(share_balances.iter().cloned()),
            deposits: initial_deposits.iter().cloned().collect(),
            snapshots: BTreeMap::new(),
            acc_royalties_per_share: 0.0,
            last_minted_block: clock.block_height(),
            secondary,
            config,
        })
    }

    pub fn address(&self) -> &AccountId {
        &self.config.address
    }

    pub fn share_ledger(&self) -> &Ledger {
        &self.shares
    }

    /// Attach observers to the share ledger.
    pub fn register_share_hooks(&mut self, hooks: LedgerHooks) {
        self.shares.register_hooks(hooks);
    }

    pub fn deposits(&self) -> &DepositRegistry {
        &self.deposits
    }

    pub fn secondary(&self) -> &SecondaryPool {
        &self.secondary
    }

    pub fn acc_royalties_per_share(&self) -> Numeric {
        self.acc_royalties_per_share
    }

    pub fn last_minted_block(&self) -> u64 {
        self.last_minted_block
    }

    pub fn stored_snapshot(&self, account: &AccountId) -> Option<&PrimaryPoolSnapshot> {
        self.snapshots.get(account)
    }

    /// Share supply including issuance not yet minted.
    ///
    /// Unbounded as the clock runs; see [`CurationPool::checked_total_shares`].
    pub fn total_shares(&self, clock: &Clock) -> Numeric {
        let growth = (1.0 + self.config.issuance_rate).powf(self.elapsed(clock) as f64);
        self.shares.total_supply() * growth
    }

    /// [`CurationPool::total_shares`], or `SupplyOverflow` once it is no
    /// longer finite. Operations that mint or price against the supply check
    /// this before touching any state.
    pub fn checked_total_shares(&self, clock: &Clock) -> Result<Numeric> {
        let total = self.total_shares(clock);
        if total.is_finite() {
            Ok(total)
        } else {
            Err(PoolError::SupplyOverflow {
                elapsed: self.elapsed(clock),
            })
        }
    }

    fn elapsed(&self, clock: &Clock) -> u64 {
        clock.block_height().saturating_sub(self.last_minted_block)
    }

    /// Move shares between holders, settling both sides around the transfer.
    pub fn transfer_shares(
        &mut self,
        env: &mut PoolEnv<'_>,
        from: &AccountId,
        to: &AccountId,
        amount: Numeric,
    ) -> Result<TransferReceipt> {
        ensure_amount(amount)?;
        self.transfer_share_tokens(env, from, to, amount)
    }

    /// Pay the account's primary-pool royalties. Returns the amount paid.
    pub fn claim_royalties(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
    ) -> Result<Numeric> {
        self.settle_royalties(env, account)
    }

    /// Primary-pool settlement of a single account.
    ///
    /// Royalties come out of the pool's own reserve balance. When the
    /// account is the secondary pool, the payout is spread over its
    /// depositors.
    fn settle_royalties(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
    ) -> Result<Numeric> {
        let previous = self.snapshot_of(account);
        let owed = previous.owed_royalties(self.acc_royalties_per_share);
        let moved = env.reserve.transfer(&self.config.address, account, owed).moved();

        if account == self.secondary.address() && moved > 0.0 {
            match self.secondary.distribute_royalties(moved) {
                Ok(()) => {}
                Err(PoolError::NoDepositors { royalties }) => {
                    self.secondary.strand_royalties(royalties)
                }
                Err(e) => return Err(e),
            }
        }

        self.snapshots.insert(
            account.clone(),
            PrimaryPoolSnapshot {
                shares: previous.shares,
                acc_royalties_per_share: self.acc_royalties_per_share,
            },
        );
        if moved > 0.0 {
            debug!(account = %account, owed, moved, "primary royalties settled");
        }
        Ok(moved)
    }

    fn pre_share_transfer(
        &mut self,
        env: &mut PoolEnv<'_>,
        from: &AccountId,
        to: &AccountId,
    ) -> Result<()> {
        self.settle_royalties(env, from)?;
        if from != to {
            self.settle_royalties(env, to)?;
        }
        Ok(())
    }

    fn post_share_transfer(&mut self, from: &AccountId, to: &AccountId) {
        self.refresh_snapshot(from);
        self.refresh_snapshot(to);
    }

    /// Snapshot the current share balance without paying anything.
    fn refresh_snapshot(&mut self, account: &AccountId) {
        self.snapshots.insert(
            account.clone(),
            PrimaryPoolSnapshot {
                shares: self.shares.balance_of(account),
                acc_royalties_per_share: self.acc_royalties_per_share,
            },
        );
    }

    fn transfer_share_tokens(
        &mut self,
        env: &mut PoolEnv<'_>,
        from: &AccountId,
        to: &AccountId,
        amount: Numeric,
    ) -> Result<TransferReceipt> {
        self.pre_share_transfer(env, from, to)?;
        let receipt = self.shares.transfer(from, to, amount);
        self.post_share_transfer(from, to);
        Ok(receipt)
    }

    fn mint_share_tokens(
        &mut self,
        env: &mut PoolEnv<'_>,
        to: &AccountId,
        amount: Numeric,
    ) -> Result<()> {
        self.settle_royalties(env, to)?;
        self.shares.mint(to, amount)?;
        self.refresh_snapshot(to);
        Ok(())
    }

    fn burn_share_tokens(
        &mut self,
        env: &mut PoolEnv<'_>,
        from: &AccountId,
        amount: Numeric,
    ) -> Result<()> {
        self.settle_royalties(env, from)?;
        self.shares.burn(from, amount)?;
        self.refresh_snapshot(from);
        Ok(())
    }

    /// Reserve cost of `shares` new shares: the pool's self-assessed value
    /// times the fraction of the enlarged supply they represent.
    fn purchase_cost(&self, env: &PoolEnv<'_>, shares: Numeric) -> Numeric {
        let pool_reserve = env.reserve.balance_of(&self.config.address);
        let total_self_assessed_value = pool_reserve * self.config.valuation_multiple;
        total_self_assessed_value * shares / (shares + self.total_shares(env.clock))
    }

    fn pay_secondary_claim(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
        payout: ClaimPayout,
    ) -> Result<ClaimPayout> {
        let source = self.secondary.address().clone();
        let shares = self
            .transfer_share_tokens(env, &source, account, payout.shares)?
            .moved();
        let royalties = env.reserve.transfer(&source, account, payout.royalties).moved();
        Ok(ClaimPayout { shares, royalties })
    }

    fn record_deposit(&mut self, account: &AccountId, amount: Numeric) {
        self.deposits.set(account, amount);
    }
}

impl DepositBook for CurationPool {
    fn deposit_of(&self, account: &AccountId) -> Numeric {
        self.deposits.deposit_of(account)
    }
}

impl PrimaryPool for CurationPool {
    fn deposit(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
        amount: Numeric,
    ) -> Result<()> {
        ensure_amount(amount)?;
        let available = env.reserve.balance_of(account);
        if available < amount {
            return Err(PoolError::InsufficientFunds {
                account: account.clone(),
                available,
                requested: amount,
            });
        }

        // Settle under the old weight before it changes.
        self.claim(env, account)?;

        let pool = self.config.address.clone();
        env.reserve.transfer(account, &pool, amount);
        let deposit = self.deposit_of(account) + amount;
        self.record_deposit(account, deposit);
        self.secondary.update_deposit(&self.deposits, account, deposit);

        debug!(account = %account, amount, deposit, "deposited");
        Ok(())
    }

    fn withdraw(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
        amount: Numeric,
    ) -> Result<()> {
        ensure_amount(amount)?;
        let deposited = self.deposit_of(account);
        if deposited < amount {
            return Err(PoolError::InsufficientDeposit {
                account: account.clone(),
                deposited,
                requested: amount,
            });
        }

        self.checked_total_shares(env.clock)?;

        let pool = self.config.address.clone();
        match self.config.withdraw_order {
            WithdrawOrder::MutateThenClaim => {
                self.record_deposit(account, deposited - amount);
                let returned = env.reserve.transfer(&pool, account, amount);
                if !returned.is_executed() {
                    warn!(
                        account = %account,
                        amount,
                        "withdrawal recorded but reserve not returned"
                    );
                }
                self.claim(env, account)?;
            }
            WithdrawOrder::ClaimFirst => {
                self.claim(env, account)?;
                self.record_deposit(account, deposited - amount);
                let returned = env.reserve.transfer(&pool, account, amount);
                if !returned.is_executed() {
                    warn!(
                        account = %account,
                        amount,
                        "withdrawal recorded but reserve not returned"
                    );
                }
            }
        }

        let deposit = self.deposit_of(account);
        self.secondary.update_deposit(&self.deposits, account, deposit);

        debug!(account = %account, amount, deposit, "withdrew");
        Ok(())
    }

    fn buy_shares(
        &mut self,
        env: &mut PoolEnv<'_>,
        account: &AccountId,
        shares: Numeric,
    ) -> Result<Numeric> {
        if !(shares.is_finite() && shares > 0.0) {
            return Err(PoolError::InvalidAmount(shares));
        }
        if !self.secondary.has_depositors() {
            return Err(PoolError::NoDepositors { royalties: 0.0 });
        }
        self.checked_total_shares(env.clock)?;

        // Minting leaves total shares unchanged and can only lower the pool's
        // reserve, so the price before minting bounds the final price.
        let quoted = self.purchase_cost(env, shares);
        let available = env.reserve.balance_of(account);
        if quoted - available >= TRANSFER_EPSILON {
            return Err(PoolError::InsufficientFunds {
                account: account.clone(),
                available,
                requested: quoted,
            });
        }

        // Purchased shares must not compound over blocks that passed before
        // they existed.
        self.mint_shares(env)?;
        let cost = self.purchase_cost(env, shares);

        let secondary = self.secondary.address().clone();
        let paid = env.reserve.transfer(account, &secondary, cost).moved();
        self.secondary.distribute_royalties(paid)?;
        self.mint_share_tokens(env, account, shares)?;

        debug!(account = %account, shares, cost = paid, "shares bought");
        Ok(paid)
    }

    fn claim(&mut self, env: &mut PoolEnv<'_>, account: &AccountId) -> Result<ClaimPayout> {
        self.mint_shares(env)?;

        // Bring the secondary pool's own primary-pool royalties in first so
        // this claim sees every royalty already owed to depositors.
        let secondary = self.secondary.address().clone();
        if account != &secondary {
            self.settle_royalties(env, &secondary)?;
        }

        let owed = self.secondary.claim(&self.deposits, account);
        let paid = self.pay_secondary_claim(env, account, owed)?;
        if !paid.is_empty() {
            debug!(account = %account, shares = paid.shares, royalties = paid.royalties, "claimed");
        }
        Ok(paid)
    }

    fn distribute_royalties(&mut self, clock: &Clock, royalties: Numeric) -> Result<()> {
        ensure_amount(royalties)?;
        let total_shares = self.checked_total_shares(clock)?;
        if total_shares <= 0.0 {
            return Err(PoolError::NoShareholders { royalties });
        }
        self.acc_royalties_per_share += royalties / total_shares;
        debug!(royalties, acc = self.acc_royalties_per_share, "primary royalties distributed");
        Ok(())
    }

    fn mint_shares(&mut self, env: &mut PoolEnv<'_>) -> Result<Numeric> {
        let gap = self.checked_total_shares(env.clock)? - self.shares.total_supply();
        let secondary = self.secondary.address().clone();

        let minted = if gap > 0.0 {
            self.mint_share_tokens(env, &secondary, gap)?;
            if self.secondary.distribute_shares(gap) == ShareDistribution::Burn {
                self.burn_share_tokens(env, &secondary, gap)?;
            }
            gap
        } else {
            0.0
        };

        self.last_minted_block = env.clock.block_height();
        Ok(minted)
    }

    fn snapshot_of(&self, account: &AccountId) -> PrimaryPoolSnapshot {
        self.snapshots
            .get(account)
            .copied()
            .unwrap_or_else(|| PrimaryPoolSnapshot {
                shares: self.shares.balance_of(account),
                acc_royalties_per_share: 0.0,
            })
    }
}

fn ensure_amount(amount: Numeric) -> Result<()> {
    if is_valid_amount(amount) {
        Ok(())
    } else {
        Err(PoolError::InvalidAmount(amount))
    }
}
