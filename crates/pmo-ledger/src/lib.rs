//! PMO Ledger Model
//!
//! Shared vocabulary for talking to an upgradeable-contract system from the
//! outside:
//!
//! - [`Address`]: opaque 20-byte account/contract identifier
//! - [`Role`]: symbolic permissioned roles, resolved per run
//! - [`Value`] / [`CallData`]: exact-equality call and state model
//! - [`ContractRef`]: a contract viewed through a declared interface
//! - [`LedgerClient`] / [`RoleRegistry`]: the external collaborators every
//!   orchestration step goes through

mod address;
mod client;
mod error;
mod role;
mod value;

// Re-exports
pub use address::{Address, AddressParseError};
pub use client::{ContractRef, LedgerClient, RoleRegistry};
pub use error::{LedgerError, RegistryError};
pub use role::Role;
pub use value::{CallData, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
