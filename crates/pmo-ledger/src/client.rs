//! Collaborator traits for the remote ledger and the role registry.
//!
//! The ledger's call/transaction model replaces conventional function calls
//! with fee-bearing, possibly-reverting operations; it is abstracted here as
//! a blocking client interface with explicit revert propagation. The system
//! of record is the remote ledger, never in-process state.

use crate::address::Address;
use crate::error::{LedgerError, RegistryError};
use crate::value::{CallData, Value};
use async_trait::async_trait;
use std::fmt;

/// A deployed contract viewed through a specific declared interface.
///
/// Calls are dispatched against the interface named here, not against
/// whatever the contract happens to be. After deploying a proxy, callers
/// must re-resolve it through the implementation's declared interface —
/// keeping the generic proxy-construction view sends every later call
/// through the wrong surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRef {
    /// The contract's persistent address.
    pub address: Address,
    /// The interface this reference dispatches through.
    pub interface: String,
}

impl ContractRef {
    /// Reference a contract through a declared interface.
    #[inline]
    #[must_use]
    pub fn new(address: Address, interface: impl Into<String>) -> Self {
        Self {
            address,
            interface: interface.into(),
        }
    }
}

impl fmt::Display for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.interface, self.address)
    }
}

/// Client for a remote, append-only ledger.
///
/// Every state-changing call blocks until the network confirms or rejects
/// it; confirmation policy (timeouts, fees) is the implementor's concern.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a state-changing transaction from `from` and block until the
    /// ledger confirms or rejects it.
    ///
    /// # Errors
    /// [`LedgerError::Reverted`] carries the collaborator's revert reason;
    /// no partial effects may be assumed after any error.
    async fn submit(
        &self,
        from: Address,
        target: &ContractRef,
        call: CallData,
    ) -> Result<Value, LedgerError>;

    /// Issue a read-only call. Must not mutate state.
    async fn read(&self, target: &ContractRef, call: CallData) -> Result<Value, LedgerError>;

    /// Deploy a proxy bound to `(implementation, admin)` and run the
    /// initializer in the same transaction, so the proxy is never
    /// observably uninitialized.
    ///
    /// # Errors
    /// On revert no proxy exists; any address the network may have assigned
    /// before the revert must be treated as non-existent.
    async fn deploy_proxy(
        &self,
        from: Address,
        implementation: Address,
        admin: Address,
        initializer: CallData,
    ) -> Result<Address, LedgerError>;
}

/// Read-only registry mapping role keys to addresses.
#[async_trait]
pub trait RoleRegistry: Send + Sync {
    /// Look up the address bound to a role key.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] for an unset key,
    /// [`RegistryError::Unavailable`] if the lookup itself fails.
    async fn get(&self, key: &str) -> Result<Address, RegistryError>;
}
