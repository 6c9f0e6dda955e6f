use std::collections::BTreeMap;

use cura_types::{AccountId, Numeric};

/// Read-only view of recorded deposits.
///
/// This is the only part of the primary pool the secondary pool consults,
/// to resolve snapshots for accounts it has never settled.
pub trait DepositBook {
    /// Recorded deposit of `account`, zero if unknown.
    fn deposit_of(&self, account: &AccountId) -> Numeric;
}

/// Per-account reserve deposits recorded by the primary pool.
///
/// The tokens themselves sit in the pool's reserve balance; this registry
/// attributes them to depositors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepositRegistry {
    deposits: BTreeMap<AccountId, Numeric>,
}

impl DepositRegistry {
    pub fn set(&mut self, account: &AccountId, amount: Numeric) {
        self.deposits.insert(account.clone(), amount);
    }

    pub fn total(&self) -> Numeric {
        self.deposits.values().sum()
    }

    pub fn as_map(&self) -> &BTreeMap<AccountId, Numeric> {
        &self.deposits
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Numeric)> {
        self.deposits.iter()
    }
}

impl FromIterator<(AccountId, Numeric)> for DepositRegistry {
    fn from_iter<T: IntoIterator<Item = (AccountId, Numeric)>>(iter: T) -> Self {
        Self {
            deposits: iter.into_iter().collect(),
        }
    }
}

impl DepositBook for DepositRegistry {
    fn deposit_of(&self, account: &AccountId) -> Numeric {
        self.deposits.get(account).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_accounts_have_no_deposit() {
        let registry: DepositRegistry = [(AccountId::from("a"), 5.0)].into_iter().collect();
        assert_eq!(registry.deposit_of(&"a".into()), 5.0);
        assert_eq!(registry.deposit_of(&"b".into()), 0.0);
    }

    #[test]
    fn set_replaces_and_total_sums() {
        let mut registry = DepositRegistry::default();
        registry.set(&"a".into(), 5.0);
        registry.set(&"b".into(), 2.0);
        registry.set(&"a".into(), 1.0);
        assert_eq!(registry.total(), 3.0);
        assert_eq!(registry.iter().count(), 2);
    }
}
