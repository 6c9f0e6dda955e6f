use cura_types::{AccountId, Numeric};
use serde::{Deserialize, Serialize};

/// Ephemeral record threaded through the transfer hook pipeline.
///
/// Pre-transfer hooks see the requested amount. Validation may reduce
/// `amount` to the sender balance before execution; post-transfer hooks see
/// the amount that was actually executed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferContext {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Numeric,
    pub sender_balance_before: Numeric,
    pub receiver_balance_before: Numeric,
}

impl TransferContext {
    /// Copy of this context with a different amount.
    pub fn with_amount(&self, amount: Numeric) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Context for the mint and burn hook stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplyContext {
    pub account: AccountId,
    pub amount: Numeric,
    pub balance_before: Numeric,
}

/// How a transfer request was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// The requested amount moved.
    Executed,
    /// The request exceeded the sender balance by less than
    /// [`cura_types::TRANSFER_EPSILON`]; the full balance moved instead.
    Clamped { requested: Numeric },
    /// The request exceeded the sender balance; nothing moved.
    Skipped { shortfall: Numeric },
    /// The amount was negative or not finite; nothing moved.
    Rejected,
}

/// Result of [`crate::Ledger::transfer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Context as seen by the post-transfer hooks.
    pub context: TransferContext,
    pub outcome: TransferOutcome,
}

impl TransferReceipt {
    /// Amount that actually changed hands.
    pub fn moved(&self) -> Numeric {
        match self.outcome {
            TransferOutcome::Executed | TransferOutcome::Clamped { .. } => self.context.amount,
            TransferOutcome::Skipped { .. } | TransferOutcome::Rejected => 0.0,
        }
    }

    /// Returns `true` if balances changed (or would have, for a self-transfer).
    pub fn is_executed(&self) -> bool {
        matches!(
            self.outcome,
            TransferOutcome::Executed | TransferOutcome::Clamped { .. }
        )
    }
}
