use cura_types::Numeric;
use serde::{Deserialize, Serialize};

/// Primary-pool position of an account at its last settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPoolSnapshot {
    pub shares: Numeric,
    pub acc_royalties_per_share: Numeric,
}

impl PrimaryPoolSnapshot {
    /// Royalties owed since this snapshot at the given accumulator value.
    pub fn owed_royalties(&self, acc_royalties_per_share: Numeric) -> Numeric {
        (acc_royalties_per_share - self.acc_royalties_per_share) * self.shares
    }
}

/// Secondary-pool position of an account at its last settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryPoolSnapshot {
    pub deposit: Numeric,
    pub acc_shares_per_deposit: Numeric,
    pub acc_royalties_per_deposit: Numeric,
}
