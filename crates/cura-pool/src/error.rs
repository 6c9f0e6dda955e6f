use cura_ledger::LedgerError;
use cura_types::{AccountId, Numeric};

/// Errors produced by pool operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// Genesis invariants do not hold.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Numeric,
        requested: Numeric,
    },

    #[error("insufficient deposit for {account}: deposited {deposited}, requested {requested}")]
    InsufficientDeposit {
        account: AccountId,
        deposited: Numeric,
        requested: Numeric,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(Numeric),

    /// Royalties cannot be spread over zero shares.
    #[error("cannot distribute {royalties} royalties: total shares is zero")]
    NoShareholders { royalties: Numeric },

    /// Royalties cannot be spread over zero deposits.
    #[error("cannot distribute {royalties} royalties: secondary pool has no deposits")]
    NoDepositors { royalties: Numeric },

    /// Compounded issuance no longer fits in a finite share supply.
    #[error("share supply overflows after {elapsed} blocks of unminted issuance")]
    SupplyOverflow { elapsed: u64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Convenience alias for pool results.
pub type Result<T> = std::result::Result<T, PoolError>;
