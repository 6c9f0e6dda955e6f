//! Fungible token ledger for the curation pool engine.
//!
//! This crate provides:
//! - [`Ledger`]: balance map plus total supply with transfer, mint, and burn
//! - Transfer and supply contexts threaded through the hook pipeline
//! - [`LedgerHooks`]: ordered observer lists for every pre/post stage
//! - The non-raising transfer path (precision clamp or logged skip)

pub mod context;
pub mod error;
pub mod hooks;
pub mod ledger;

pub use context::{SupplyContext, TransferContext, TransferOutcome, TransferReceipt};
pub use error::LedgerError;
pub use hooks::{HookStage, LedgerHooks, SupplyHook, TransferHook};
pub use ledger::Ledger;
