//! Foundation types for the curation pool engine.
//!
//! Every other crate in the workspace depends on `cura-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] -- Opaque account identifier
//! - [`Numeric`] -- Token amount representation
//! - [`Clock`] -- Virtual block counter driven by the replay harness

pub mod account;
pub mod clock;

pub use account::AccountId;
pub use clock::Clock;

/// Token amounts, share counts, and accumulator values.
pub type Numeric = f64;

/// Largest shortfall a transfer absorbs by clamping to the sender balance.
pub const TRANSFER_EPSILON: Numeric = 1e-6;

/// Returns `true` if `amount` is a finite, non-negative quantity.
pub fn is_valid_amount(amount: Numeric) -> bool {
    amount.is_finite() && amount >= 0.0
}
