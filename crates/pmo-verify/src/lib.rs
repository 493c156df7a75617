//! PMO Invariant Verifier
//!
//! Captures observable contract state around an implementation swap and
//! proves the swap changed only what it was meant to change:
//!
//! - [`StateSnapshot`] / [`snapshot`]: all-or-nothing capture of a fixed
//!   accessor field set
//! - [`verify_preserved`]: exact-equality comparison returning mismatches
//!   as data
//! - [`verify_transition`]: a previously-reverting operation now succeeds,
//!   with pre/post predicates around it

mod error;
mod snapshot;
mod transition;

// Re-exports
pub use error::VerifyError;
pub use snapshot::{snapshot, verify_preserved, StateSnapshot};
pub use transition::verify_transition;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
