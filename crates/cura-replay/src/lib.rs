//! Deterministic replay of curation pool scenarios.
//!
//! A [`Scenario`] describes genesis balances, pool parameters, and an
//! ordered list of [`Action`]s. The [`ReplayEngine`] composes a fresh
//! [`State`], resolves each action into a typed [`Operation`], applies it,
//! and records a projection of the state after every step.
//!
//! # Targets
//!
//! - `chain` -- `SLEEP`, `STEP`
//! - `reserveToken` -- `TRANSFER`, `MINT`
//! - `curationPool` -- `DEPOSIT`, `WITHDRAW`, `BUY_SHARES`, `CLAIM`,
//!   `MINT_SHARES`, `DISTRIBUTE_ROYALTIES`, `CLAIM_ROYALTIES`,
//!   `TRANSFER_SHARES`

pub mod action;
pub mod engine;
pub mod error;
pub mod projection;
pub mod scenario;
pub mod state;

pub use action::{Action, ActionArg, ActionKind, Operation, Target};
pub use engine::{FailurePolicy, ReplayEngine, Trace, TraceRecord, INITIAL_STATE};
pub use error::{ReplayError, ReplayResult};
pub use projection::StateProjection;
pub use scenario::Scenario;
pub use state::State;
