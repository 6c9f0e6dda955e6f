use std::collections::BTreeMap;
use std::fmt;

use cura_types::{is_valid_amount, AccountId, Numeric, TRANSFER_EPSILON};
use tracing::{debug, info, warn};

use crate::context::{SupplyContext, TransferContext, TransferOutcome, TransferReceipt};
use crate::error::LedgerError;
use crate::hooks::{HookStage, LedgerHooks};

/// Fungible token ledger: a balance map plus total supply.
///
/// `total_supply` equals the sum of all balances after every mutation.
/// Unknown accounts have a balance of zero.
#[derive(Default)]
pub struct Ledger {
    balances: BTreeMap<AccountId, Numeric>,
    total_supply: Numeric,
    hooks: LedgerHooks,
}

impl Ledger {
    /// Build a ledger from genesis balances. Repeated accounts accumulate.
    pub fn with_balances<I, A>(balances: I) -> Self
    where
        I: IntoIterator<Item = (A, Numeric)>,
        A: Into<AccountId>,
    {
        let mut map: BTreeMap<AccountId, Numeric> = BTreeMap::new();
        for (account, amount) in balances {
            *map.entry(account.into()).or_insert(0.0) += amount;
        }
        let total_supply = map.values().sum();
        Self {
            balances: map,
            total_supply,
            hooks: LedgerHooks::default(),
        }
    }

    /// Append hooks after any already registered for each stage.
    pub fn register_hooks(&mut self, hooks: LedgerHooks) {
        self.hooks.append(hooks);
    }

    pub fn balance_of(&self, account: &AccountId) -> Numeric {
        self.balances.get(account).copied().unwrap_or(0.0)
    }

    pub fn total_supply(&self) -> Numeric {
        self.total_supply
    }

    pub fn balances(&self) -> &BTreeMap<AccountId, Numeric> {
        &self.balances
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Never fails. A request that overshoots the sender balance by less than
    /// [`TRANSFER_EPSILON`] is clamped to the balance; a larger overshoot
    /// leaves every balance untouched. Check [`TransferReceipt::moved`] for
    /// what actually moved. Hooks for both stages fire in every case.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Numeric,
    ) -> TransferReceipt {
        let requested = TransferContext {
            from: from.clone(),
            to: to.clone(),
            amount,
            sender_balance_before: self.balance_of(from),
            receiver_balance_before: self.balance_of(to),
        };

        self.hooks.run_transfer(HookStage::PreTransfer, &requested);

        let receipt = validate_transfer(requested);
        if receipt.is_executed() {
            self.execute_transfer(&receipt.context);
        }

        self.hooks.run_transfer(HookStage::PostTransfer, &receipt.context);
        receipt
    }

    pub fn mint(&mut self, to: &AccountId, amount: Numeric) -> Result<SupplyContext, LedgerError> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let context = SupplyContext {
            account: to.clone(),
            amount,
            balance_before: self.balance_of(to),
        };

        self.hooks.run_supply(HookStage::PreMint, &context);
        self.balances.insert(to.clone(), context.balance_before + amount);
        self.total_supply += amount;
        debug!(account = %to, amount, supply = self.total_supply, "minted");
        self.hooks.run_supply(HookStage::PostMint, &context);

        Ok(context)
    }

    pub fn burn(
        &mut self,
        from: &AccountId,
        amount: Numeric,
    ) -> Result<SupplyContext, LedgerError> {
        if !is_valid_amount(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let context = SupplyContext {
            account: from.clone(),
            amount,
            balance_before: self.balance_of(from),
        };

        self.hooks.run_supply(HookStage::PreBurn, &context);
        if context.balance_before < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                balance: context.balance_before,
                requested: amount,
            });
        }
        self.balances.insert(from.clone(), context.balance_before - amount);
        self.total_supply -= amount;
        debug!(account = %from, amount, supply = self.total_supply, "burned");
        self.hooks.run_supply(HookStage::PostBurn, &context);

        Ok(context)
    }

    fn execute_transfer(&mut self, context: &TransferContext) {
        if context.from == context.to {
            return;
        }
        self.balances.insert(
            context.from.clone(),
            context.sender_balance_before - context.amount,
        );
        self.balances.insert(
            context.to.clone(),
            context.receiver_balance_before + context.amount,
        );
    }
}

fn validate_transfer(context: TransferContext) -> TransferReceipt {
    if !is_valid_amount(context.amount) {
        warn!(from = %context.from, to = %context.to, amount = context.amount, "transfer rejected: invalid amount");
        return TransferReceipt {
            context,
            outcome: TransferOutcome::Rejected,
        };
    }

    let available = context.sender_balance_before;
    if available >= context.amount {
        return TransferReceipt {
            context,
            outcome: TransferOutcome::Executed,
        };
    }

    let shortfall = context.amount - available;
    if shortfall < TRANSFER_EPSILON {
        info!(from = %context.from, to = %context.to, requested = context.amount, available, "transfer clamped to available balance");
        let requested = context.amount;
        TransferReceipt {
            context: context.with_amount(available),
            outcome: TransferOutcome::Clamped { requested },
        }
    } else {
        warn!(from = %context.from, to = %context.to, requested = context.amount, available, shortfall, "transfer skipped: insufficient funds");
        TransferReceipt {
            context,
            outcome: TransferOutcome::Skipped { shortfall },
        }
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("balances", &self.balances)
            .field("total_supply", &self.total_supply)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;

    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::from(s)
    }

    fn ledger() -> Ledger {
        Ledger::with_balances([("alice", 100.0), ("bob", 5.0)])
    }

    #[test]
    fn genesis_total_supply_is_sum() {
        let l = Ledger::with_balances([("a", 1.0), ("b", 2.5), ("a", 0.5)]);
        assert_eq!(l.balance_of(&acct("a")), 1.5);
        assert_eq!(l.total_supply(), 4.0);
        assert_eq!(l.balance_of(&acct("nobody")), 0.0);
    }

    #[test]
    fn transfer_moves_requested_amount() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("alice"), &acct("bob"), 40.0);
        assert_eq!(receipt.outcome, TransferOutcome::Executed);
        assert_eq!(receipt.moved(), 40.0);
        assert_eq!(l.balance_of(&acct("alice")), 60.0);
        assert_eq!(l.balance_of(&acct("bob")), 45.0);
        assert_eq!(l.total_supply(), 105.0);
    }

    #[test]
    fn transfer_within_epsilon_is_clamped() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("bob"), &acct("carol"), 5.0 + 5e-7);
        assert!(matches!(receipt.outcome, TransferOutcome::Clamped { .. }));
        assert_eq!(receipt.moved(), 5.0);
        assert_eq!(l.balance_of(&acct("bob")), 0.0);
        assert_eq!(l.balance_of(&acct("carol")), 5.0);
    }

    #[test]
    fn transfer_beyond_epsilon_is_noop() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("bob"), &acct("alice"), 6.0);
        assert!(matches!(receipt.outcome, TransferOutcome::Skipped { .. }));
        assert_eq!(receipt.moved(), 0.0);
        assert_eq!(l.balance_of(&acct("bob")), 5.0);
        assert_eq!(l.balance_of(&acct("alice")), 100.0);
        assert!(!l.balances().contains_key("carol"));
    }

    #[test]
    fn shortfall_of_exactly_epsilon_is_skipped() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("dave"), &acct("alice"), TRANSFER_EPSILON);
        assert_eq!(
            receipt.outcome,
            TransferOutcome::Skipped {
                shortfall: TRANSFER_EPSILON
            }
        );
        assert_eq!(receipt.moved(), 0.0);

        let receipt = l.transfer(&acct("dave"), &acct("alice"), TRANSFER_EPSILON / 2.0);
        assert!(matches!(receipt.outcome, TransferOutcome::Clamped { .. }));
        assert_eq!(receipt.moved(), 0.0);
        assert_eq!(l.balance_of(&acct("alice")), 100.0);
    }

    #[test]
    fn negative_transfer_is_rejected() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("bob"), &acct("alice"), -10.0);
        assert_eq!(receipt.outcome, TransferOutcome::Rejected);
        assert_eq!(l.balance_of(&acct("bob")), 5.0);
    }

    #[test]
    fn self_transfer_changes_nothing() {
        let mut l = ledger();
        let receipt = l.transfer(&acct("alice"), &acct("alice"), 30.0);
        assert!(receipt.is_executed());
        assert_eq!(l.balance_of(&acct("alice")), 100.0);
        assert_eq!(l.total_supply(), 105.0);
    }

    #[test]
    fn transfer_hooks_fire_even_when_skipped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pre = Arc::clone(&seen);
        let post = Arc::clone(&seen);

        let mut l = ledger();
        l.register_hooks(
            LedgerHooks::new()
                .pre_transfer(move |ctx| pre.lock().unwrap().push(("pre", ctx.amount)))
                .post_transfer(move |ctx| post.lock().unwrap().push(("post", ctx.amount))),
        );

        l.transfer(&acct("bob"), &acct("alice"), 500.0);
        l.transfer(&acct("bob"), &acct("alice"), 5.0 + 1e-7);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("pre", 500.0));
        assert_eq!(seen[1], ("post", 500.0));
        assert_eq!(seen[2], ("pre", 5.0 + 1e-7));
        assert_eq!(seen[3], ("post", 5.0));
    }

    #[test]
    fn mint_and_burn_update_supply() {
        let mut l = ledger();
        l.mint(&acct("carol"), 10.0).unwrap();
        assert_eq!(l.balance_of(&acct("carol")), 10.0);
        assert_eq!(l.total_supply(), 115.0);

        let ctx = l.burn(&acct("alice"), 25.0).unwrap();
        assert_eq!(ctx.balance_before, 100.0);
        assert_eq!(l.balance_of(&acct("alice")), 75.0);
        assert_eq!(l.total_supply(), 90.0);
    }

    #[test]
    fn burn_beyond_balance_fails() {
        let mut l = ledger();
        let err = l.burn(&acct("bob"), 6.0).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: acct("bob"),
                balance: 5.0,
                requested: 6.0,
            }
        );
        assert_eq!(l.balance_of(&acct("bob")), 5.0);
        assert_eq!(l.total_supply(), 105.0);
    }

    #[test]
    fn mint_rejects_invalid_amounts() {
        let mut l = ledger();
        assert_eq!(
            l.mint(&acct("a"), f64::NAN).unwrap_err().to_string(),
            "invalid amount: NaN"
        );
        assert!(l.mint(&acct("a"), -1.0).is_err());
        assert_eq!(l.total_supply(), 105.0);
    }

    #[test]
    fn supply_hooks_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c, d) = (
            Arc::clone(&seen),
            Arc::clone(&seen),
            Arc::clone(&seen),
            Arc::clone(&seen),
        );
        let mut l = ledger();
        l.register_hooks(
            LedgerHooks::new()
                .pre_mint(move |_| a.lock().unwrap().push("pre_mint"))
                .post_mint(move |_| b.lock().unwrap().push("post_mint"))
                .pre_burn(move |_| c.lock().unwrap().push("pre_burn"))
                .post_burn(move |_| d.lock().unwrap().push("post_burn")),
        );
        l.mint(&acct("bob"), 1.0).unwrap();
        l.burn(&acct("bob"), 1.0).unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["pre_mint", "post_mint", "pre_burn", "post_burn"]
        );
    }

    proptest! {
        #[test]
        fn transfer_moves_min_of_amount_and_balance(
            balance in 0.0f64..1_000.0,
            excess in -500.0f64..9e-7,
        ) {
            let mut l = Ledger::with_balances([("from", balance)]);
            let amount = (balance + excess).max(0.0);
            let receipt = l.transfer(&acct("from"), &acct("to"), amount);
            let expected = amount.min(balance);
            prop_assert_eq!(receipt.moved(), expected);
            prop_assert_eq!(l.balance_of(&acct("to")), expected);
        }

        #[test]
        fn overdrawn_transfer_is_bit_identical(
            balance in 0.0f64..1_000.0,
            excess in 1e-6f64..1_000.0,
            receiver in 0.0f64..1_000.0,
        ) {
            let mut l = Ledger::with_balances([("from", balance), ("to", receiver)]);
            l.transfer(&acct("from"), &acct("to"), balance + excess + 1e-6);
            prop_assert_eq!(l.balance_of(&acct("from")).to_bits(), balance.to_bits());
            prop_assert_eq!(l.balance_of(&acct("to")).to_bits(), receiver.to_bits());
        }
    }
}
