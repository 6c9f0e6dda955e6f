use cura_types::{AccountId, Numeric};

/// Errors produced by ledger mutations.
///
/// Transfers never fail; see [`crate::TransferOutcome`] for their degraded
/// modes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        balance: Numeric,
        requested: Numeric,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(Numeric),
}
