use std::collections::BTreeSet;

use cura_types::{AccountId, Numeric};
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};

/// Order of operations inside [`crate::PrimaryPool::withdraw`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawOrder {
    /// Decrement the deposit and return reserve tokens, then claim.
    ///
    /// An account that has never been settled and withdraws its whole
    /// genesis deposit resolves to an empty snapshot during the claim, so it
    /// receives nothing and the secondary pool keeps counting the withdrawn
    /// weight.
    #[default]
    MutateThenClaim,
    /// Claim under the old deposit weight first, mirroring `deposit`.
    ClaimFirst,
}

/// Parameters for a curation pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Address holding the pooled reserve deposits.
    pub address: AccountId,
    /// Address of the secondary pool inside both ledgers.
    pub secondary_address: AccountId,
    /// Per-block share issuance rate `r`.
    pub issuance_rate: Numeric,
    /// Ratio between the curators' self-assessed share value and the reserve
    /// held by the pool.
    pub valuation_multiple: Numeric,
    pub withdraw_order: WithdrawOrder,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            address: AccountId::from("curationPool"),
            secondary_address: AccountId::from("secondaryPool"),
            issuance_rate: 0.0,
            valuation_multiple: 1.0,
            withdraw_order: WithdrawOrder::default(),
        }
    }
}

impl PoolConfig {
    pub fn with_issuance_rate(mut self, issuance_rate: Numeric) -> Self {
        self.issuance_rate = issuance_rate;
        self
    }

    pub fn with_valuation_multiple(mut self, valuation_multiple: Numeric) -> Self {
        self.valuation_multiple = valuation_multiple;
        self
    }

    pub fn with_withdraw_order(mut self, order: WithdrawOrder) -> Self {
        self.withdraw_order = order;
        self
    }

    /// Check parameter ranges. Genesis balances are checked by the pool.
    pub fn validate(&self) -> Result<()> {
        if self.address == self.secondary_address {
            return Err(PoolError::Configuration(format!(
                "pool and secondary pool share the address {}",
                self.address
            )));
        }
        if !self.issuance_rate.is_finite() || self.issuance_rate < 0.0 {
            return Err(PoolError::Configuration(format!(
                "issuance rate must be finite and non-negative, got {}",
                self.issuance_rate
            )));
        }
        if !self.valuation_multiple.is_finite() || self.valuation_multiple < 0.0 {
            return Err(PoolError::Configuration(format!(
                "valuation multiple must be finite and non-negative, got {}",
                self.valuation_multiple
            )));
        }
        Ok(())
    }
}

/// Genesis balances for a run: three `account -> amount` association lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genesis {
    pub reserve_balances: Vec<(AccountId, Numeric)>,
    pub share_balances: Vec<(AccountId, Numeric)>,
    pub deposits: Vec<(AccountId, Numeric)>,
}

impl Genesis {
    /// Sum of the genesis deposits.
    pub fn total_deposits(&self) -> Numeric {
        self.deposits.iter().map(|(_, amount)| amount).sum()
    }
}

/// Reject association lists that name the same account twice.
pub(crate) fn ensure_unique(list: &[(AccountId, Numeric)], what: &str) -> Result<()> {
    let mut seen = BTreeSet::new();
    for (account, _) in list {
        if !seen.insert(account) {
            return Err(PoolError::Configuration(format!(
                "{what} list names {account} more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_addresses() {
        let config = PoolConfig::default();
        assert_eq!(config.address.as_str(), "curationPool");
        assert_eq!(config.secondary_address.as_str(), "secondaryPool");
        assert_eq!(config.valuation_multiple, 1.0);
        assert_eq!(config.withdraw_order, WithdrawOrder::MutateThenClaim);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(PoolConfig::default()
            .with_issuance_rate(-0.01)
            .validate()
            .is_err());
        assert!(PoolConfig::default()
            .with_issuance_rate(f64::NAN)
            .validate()
            .is_err());
        assert!(PoolConfig::default()
            .with_valuation_multiple(-1.0)
            .validate()
            .is_err());

        let mut same = PoolConfig::default();
        same.secondary_address = same.address.clone();
        assert!(matches!(same.validate(), Err(PoolError::Configuration(_))));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: PoolConfig = toml::from_str(
            r#"
            issuance_rate = 0.0001
            withdraw_order = "claim_first"
            "#,
        )
        .unwrap();
        assert_eq!(config.issuance_rate, 0.0001);
        assert_eq!(config.withdraw_order, WithdrawOrder::ClaimFirst);
        assert_eq!(config.address.as_str(), "curationPool");
    }

    #[test]
    fn genesis_from_json_lists() {
        let genesis: Genesis = serde_json::from_str(
            r#"{
                "reserve_balances": [["curationPool", 500], ["curator2", 1000]],
                "deposits": [["curator1", 500], ["curator2", 0]]
            }"#,
        )
        .unwrap();
        assert_eq!(genesis.reserve_balances.len(), 2);
        assert!(genesis.share_balances.is_empty());
        assert_eq!(genesis.total_deposits(), 500.0);
    }

    #[test]
    fn duplicate_accounts_are_rejected() {
        let list = vec![("a".into(), 1.0), ("b".into(), 2.0), ("a".into(), 3.0)];
        let err = ensure_unique(&list, "deposit").unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: deposit list names a more than once"
        );
    }
}
