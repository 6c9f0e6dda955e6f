//! Two-tier curation pool accounting.
//!
//! The primary [`CurationPool`] takes reserve-token deposits, issues shares at
//! a fixed per-block rate, sells new shares at a dilution price, and spreads
//! royalties over all shares. Newly issued shares and purchase proceeds flow
//! to the [`SecondaryPool`], which distributes them to depositors in
//! proportion to their deposits.
//!
//! # Settlement
//!
//! Nothing is pushed to holders eagerly. Each pool keeps a global
//! accumulator per unit (royalties per share, shares and royalties per
//! deposit) and a snapshot per account; an account's entitlement is the
//! accumulator delta times the weight recorded in its snapshot. Issuance is
//! virtual until [`PrimaryPool::mint_shares`] materializes it.
//!
//! # Design Rules
//!
//! 1. Every share movement settles the affected accounts' royalties first.
//! 2. Weight changes (deposit, withdraw) are preceded by a claim.
//! 3. Recorded deposits always sum to the pool's reserve balance.
//! 4. The clock and the reserve ledger are lent per call via [`PoolEnv`].

pub mod book;
pub mod config;
pub mod curation;
pub mod error;
pub mod secondary;
pub mod snapshot;
pub mod traits;

pub use book::{DepositBook, DepositRegistry};
pub use config::{Genesis, PoolConfig, WithdrawOrder};
pub use curation::CurationPool;
pub use error::{PoolError, Result};
pub use secondary::{ClaimPayout, SecondaryPool, ShareDistribution};
pub use snapshot::{PrimaryPoolSnapshot, SecondaryPoolSnapshot};
pub use traits::{PoolEnv, PrimaryPool};
