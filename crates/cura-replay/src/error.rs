use cura_ledger::LedgerError;
use cura_pool::PoolError;
use thiserror::Error;

use crate::action::{ActionKind, Target};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The target component does not expose this action kind.
    #[error("{target} does not support {kind}")]
    UnsupportedAction { kind: ActionKind, target: Target },

    #[error("invalid arguments for {kind}: {reason}")]
    InvalidArguments { kind: ActionKind, reason: String },

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReplayResult<T> = Result<T, ReplayError>;
