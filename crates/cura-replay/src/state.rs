use cura_ledger::Ledger;
use cura_pool::{CurationPool, Genesis, PoolConfig, PoolEnv, PrimaryPool};
use cura_types::Clock;
use tracing::debug;

use crate::action::Operation;
use crate::error::ReplayResult;

/// Everything a replay mutates: the clock, the reserve token, and the pool.
#[derive(Debug)]
pub struct State {
    pub clock: Clock,
    pub reserve: Ledger,
    pub pool: CurationPool,
}

impl State {
    /// Compose a fresh state from genesis balances at block zero.
    ///
    /// The reserve balances must already credit the pool address with the
    /// genesis deposits.
    pub fn setup(genesis: &Genesis, config: PoolConfig) -> ReplayResult<Self> {
        let clock = Clock::default();
        let reserve = Ledger::with_balances(genesis.reserve_balances.iter().cloned());
        let pool = CurationPool::new(
            config,
            &genesis.share_balances,
            &genesis.deposits,
            &reserve,
            &clock,
        )?;
        Ok(Self {
            clock,
            reserve,
            pool,
        })
    }

    /// Apply one resolved operation.
    pub fn apply(&mut self, operation: &Operation) -> ReplayResult<()> {
        let Self {
            clock,
            reserve,
            pool,
        } = self;

        match operation {
            Operation::Sleep(blocks) => clock.sleep(*blocks),
            Operation::Step => clock.step(),
            Operation::Transfer { from, to, amount } => {
                reserve.transfer(from, to, *amount);
            }
            Operation::Mint { to, amount } => {
                reserve.mint(to, *amount)?;
            }
            Operation::Deposit { account, amount } => {
                pool.deposit(&mut PoolEnv::new(clock, reserve), account, *amount)?
            }
            Operation::Withdraw { account, amount } => {
                pool.withdraw(&mut PoolEnv::new(clock, reserve), account, *amount)?
            }
            Operation::BuyShares { account, shares } => {
                pool.buy_shares(&mut PoolEnv::new(clock, reserve), account, *shares)?;
            }
            Operation::Claim { account } => {
                pool.claim(&mut PoolEnv::new(clock, reserve), account)?;
            }
            Operation::MintShares => {
                pool.mint_shares(&mut PoolEnv::new(clock, reserve))?;
            }
            Operation::DistributeRoyalties { royalties } => {
                pool.distribute_royalties(clock, *royalties)?
            }
            Operation::ClaimRoyalties { account } => {
                pool.claim_royalties(&mut PoolEnv::new(clock, reserve), account)?;
            }
            Operation::TransferShares { from, to, amount } => {
                pool.transfer_shares(&mut PoolEnv::new(clock, reserve), from, to, *amount)?;
            }
        }
        debug!(block = self.clock.block_height(), ?operation, "applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cura_pool::{DepositBook, PoolError};
    use cura_types::AccountId;

    use super::*;
    use crate::error::ReplayError;

    fn genesis() -> Genesis {
        Genesis {
            reserve_balances: vec![
                ("curationPool".into(), 500.0),
                ("curator2".into(), 1000.0),
            ],
            share_balances: vec![("curator1".into(), 1000.0)],
            deposits: vec![("curator1".into(), 500.0)],
        }
    }

    #[test]
    fn setup_composes_pool_at_genesis() {
        let state = State::setup(&genesis(), PoolConfig::default()).unwrap();
        assert_eq!(state.clock.block_height(), 0);
        assert_eq!(state.reserve.total_supply(), 1500.0);
        assert_eq!(state.pool.deposit_of(&AccountId::from("curator1")), 500.0);
    }

    #[test]
    fn setup_rejects_unbacked_deposits() {
        let mut genesis = genesis();
        genesis.deposits.push(("curator2".into(), 10.0));
        let err = State::setup(&genesis, PoolConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Pool(PoolError::Configuration(_))));
    }

    #[test]
    fn chain_and_reserve_operations() {
        let mut state = State::setup(&genesis(), PoolConfig::default()).unwrap();
        state.apply(&Operation::Sleep(10)).unwrap();
        state.apply(&Operation::Step).unwrap();
        assert_eq!(state.clock.block_height(), 11);

        state
            .apply(&Operation::Mint {
                to: "curator3".into(),
                amount: 5.0,
            })
            .unwrap();
        state
            .apply(&Operation::Transfer {
                from: "curator3".into(),
                to: "curator2".into(),
                amount: 2.0,
            })
            .unwrap();
        assert_eq!(state.reserve.balance_of(&"curator2".into()), 1002.0);
        assert_eq!(state.reserve.balance_of(&"curator3".into()), 3.0);
    }

    #[test]
    fn pool_errors_surface_without_mutation() {
        let mut state = State::setup(&genesis(), PoolConfig::default()).unwrap();
        let err = state
            .apply(&Operation::Deposit {
                account: "curator2".into(),
                amount: 2000.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Pool(PoolError::InsufficientFunds { .. })
        ));
        assert_eq!(state.reserve.balance_of(&"curator2".into()), 1000.0);
    }
}
