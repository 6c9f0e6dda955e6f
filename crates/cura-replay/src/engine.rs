use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::action::{Action, Operation};
use crate::error::ReplayResult;
use crate::state::State;

/// Label of the record taken before the first action.
pub const INITIAL_STATE: &str = "INITIAL_STATE";

/// What the engine does when an action fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the error and stop.
    #[default]
    FailFast,
    /// Log the error, record the unchanged state, and keep going.
    Collect,
}

/// One entry of a replay trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord<S> {
    pub index: usize,
    /// `None` for the initial record.
    pub action: Option<Action>,
    pub state: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<S> TraceRecord<S> {
    pub fn label(&self) -> String {
        match &self.action {
            Some(action) => action.to_string(),
            None => INITIAL_STATE.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered records of a replay: the initial state, then one per action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace<S> {
    records: Vec<TraceRecord<S>>,
}

impl<S> Trace<S> {
    pub fn records(&self) -> &[TraceRecord<S>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// State recorded after the last action.
    pub fn final_state(&self) -> Option<&S> {
        self.records.last().map(|record| &record.state)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TraceRecord<S>> {
        self.records.iter().filter(|record| record.is_failure())
    }
}

/// Drives a [`State`] through a list of actions in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplayEngine {
    policy: FailurePolicy,
}

impl ReplayEngine {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Resolve every action without applying any of them.
    pub fn check(&self, actions: &[Action]) -> ReplayResult<Vec<Operation>> {
        actions.iter().map(Operation::resolve).collect()
    }

    /// Apply `actions` to `state`, projecting the state with `record_state`
    /// once up front and once after every action.
    pub fn run<S, F>(
        &self,
        state: &mut State,
        actions: &[Action],
        mut record_state: F,
    ) -> ReplayResult<Trace<S>>
    where
        F: FnMut(&State) -> S,
    {
        info!(actions = actions.len(), policy = ?self.policy, "replay started");

        let mut records = Vec::with_capacity(actions.len() + 1);
        records.push(TraceRecord {
            index: 0,
            action: None,
            state: record_state(state),
            error: None,
        });

        let mut failures = 0usize;
        for (offset, action) in actions.iter().enumerate() {
            let index = offset + 1;
            let outcome = Operation::resolve(action).and_then(|op| state.apply(&op));
            let error = match outcome {
                Ok(()) => None,
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::Collect => {
                        failures += 1;
                        error!(index, action = %action, error = %e, "action failed");
                        Some(e.to_string())
                    }
                },
            };
            records.push(TraceRecord {
                index,
                action: Some(action.clone()),
                state: record_state(state),
                error,
            });
        }

        info!(
            records = records.len(),
            failures,
            block = state.clock.block_height(),
            "replay finished"
        );
        Ok(Trace { records })
    }
}

#[cfg(test)]
mod tests {
    use cura_pool::{Genesis, PoolConfig};

    use super::*;
    use crate::error::ReplayError;
    use crate::projection::StateProjection;

    fn state() -> State {
        let genesis = Genesis {
            reserve_balances: vec![
                ("curationPool".into(), 500.0),
                ("curator2".into(), 1000.0),
            ],
            share_balances: vec![("founder".into(), 1000.0)],
            deposits: vec![("curator1".into(), 500.0)],
        };
        State::setup(&genesis, PoolConfig::default().with_issuance_rate(0.001)).unwrap()
    }

    fn actions() -> Vec<Action> {
        vec![
            Action::sleep(1),
            Action::deposit("curator2", 5000.0),
            Action::deposit("curator2", 1000.0),
        ]
    }

    #[test]
    fn records_initial_state_then_one_per_action() {
        let mut state = state();
        let trace = ReplayEngine::new(FailurePolicy::Collect)
            .run(&mut state, &[Action::sleep(3), Action::sleep(4)], |s| {
                s.clock.block_height()
            })
            .unwrap();

        let heights: Vec<u64> = trace.records().iter().map(|r| r.state).collect();
        assert_eq!(heights, vec![0, 3, 7]);
        assert_eq!(trace.records()[0].label(), INITIAL_STATE);
        assert_eq!(trace.records()[1].label(), "SLEEP chain(3)");
        assert_eq!(trace.final_state(), Some(&7));
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let mut state = state();
        let err = ReplayEngine::new(FailurePolicy::FailFast)
            .run(&mut state, &actions(), StateProjection::capture)
            .unwrap_err();
        assert!(matches!(err, ReplayError::Pool(_)));
        // The third action never ran.
        assert_eq!(state.reserve.balance_of(&"curator2".into()), 1000.0);
    }

    #[test]
    fn collect_records_unchanged_state_and_continues() {
        let mut state = state();
        let trace = ReplayEngine::new(FailurePolicy::Collect)
            .run(&mut state, &actions(), StateProjection::capture)
            .unwrap();

        assert_eq!(trace.len(), 4);
        let records = trace.records();
        assert!(records[2].is_failure());
        assert!(records[2]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("insufficient funds")));
        assert_eq!(records[2].state, records[1].state);

        assert!(!records[3].is_failure());
        assert_eq!(records[3].state.deposit_of("curator2"), 1000.0);
        assert_eq!(trace.failures().count(), 1);
    }

    #[test]
    fn unresolvable_actions_are_failures_too() {
        let bogus = Action::new(
            crate::action::ActionKind::Claim,
            crate::action::Target::Chain,
            vec!["curator1".into()],
        );
        let mut state = state();
        let engine = ReplayEngine::new(FailurePolicy::Collect);
        assert!(engine.check(&[bogus.clone()]).is_err());

        let trace = engine
            .run(&mut state, &[bogus], |s| s.clock.block_height())
            .unwrap();
        assert_eq!(
            trace.records()[1].error.as_deref(),
            Some("chain does not support CLAIM")
        );
    }

    #[test]
    fn trace_serializes_as_a_list() {
        let mut state = state();
        let trace = ReplayEngine::default()
            .run(&mut state, &[Action::sleep(2)], |s| s.clock.block_height())
            .unwrap();
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"index": 0, "action": null, "state": 0},
                {"index": 1, "action": {"kind": "SLEEP", "target": "chain", "args": [2.0]}, "state": 2}
            ])
        );
    }

    #[test]
    fn two_depositors_converge_to_deposit_ratio() {
        let mut state = state();
        let mut actions = vec![Action::sleep(1), Action::deposit("curator2", 1000.0)];
        for _ in 0..100 {
            actions.push(Action::sleep(100));
            actions.push(Action::claim("curator1"));
            actions.push(Action::claim("curator2"));
        }
        let trace = ReplayEngine::new(FailurePolicy::FailFast)
            .run(&mut state, &actions, StateProjection::capture)
            .unwrap();

        let last = trace.final_state().unwrap();
        let ratio = last.shares_of("curator2") / last.shares_of("curator1");
        assert!((ratio - 2.0).abs() < 1e-3, "ratio {ratio}");
    }
}
