use std::path::Path;

use cura_pool::{Genesis, PoolConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Action;
use crate::engine::{FailurePolicy, ReplayEngine, Trace};
use crate::error::{ReplayError, ReplayResult};
use crate::projection::StateProjection;
use crate::state::State;

/// A complete replay description: genesis balances, pool parameters,
/// failure policy, and the ordered actions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,
    pub genesis: Genesis,
    pub pool: PoolConfig,
    pub policy: FailurePolicy,
    pub actions: Vec<Action>,
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> ReplayResult<Self> {
        toml::from_str(input).map_err(|e| ReplayError::Scenario(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> ReplayResult<Self> {
        serde_json::from_str(input).map_err(|e| ReplayError::Scenario(e.to_string()))
    }

    /// Load a scenario file. `.json` files are read as JSON, anything else
    /// as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), is_json, "loading scenario");
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    /// Fresh state for this scenario's genesis.
    pub fn state(&self) -> ReplayResult<State> {
        State::setup(&self.genesis, self.pool.clone())
    }

    /// Run the scenario under its own policy with the default projection.
    pub fn run(&self) -> ReplayResult<Trace<StateProjection>> {
        self.run_with(self.policy)
    }

    pub fn run_with(&self, policy: FailurePolicy) -> ReplayResult<Trace<StateProjection>> {
        let mut state = self.state()?;
        ReplayEngine::new(policy).run(&mut state, &self.actions, StateProjection::capture)
    }
}
