//! Error types for ledger and registry collaborators.

use crate::address::Address;
use crate::value::Value;

/// Failure reported by the remote ledger for a call or transaction.
///
/// Everything here is either a configuration problem or a ledger-confirmed
/// rejection; none of it is transient in a way a blind retry would fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The ledger confirmed the transaction and rejected it.
    #[error("transaction reverted: {reason}")]
    Reverted {
        /// Revert reason as reported by the collaborator, verbatim.
        reason: String,
    },

    /// No contract is deployed at the target address.
    #[error("unknown contract {address}")]
    UnknownContract {
        /// The address that was called.
        address: Address,
    },

    /// The declared interface does not expose the requested method.
    ///
    /// Calling through the wrong interface, or through one a later
    /// implementation no longer supports, lands here.
    #[error("no method {method:?} on interface {interface:?}")]
    UnknownMethod {
        /// Interface the caller resolved the contract through.
        interface: String,
        /// Method that was requested.
        method: String,
    },

    /// A read returned a value of an unexpected shape.
    #[error("unexpected value from {method:?}: {value}")]
    Decode {
        /// Accessor that produced the value.
        method: String,
        /// The value that could not be interpreted.
        value: Value,
    },

    /// The ledger itself could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl LedgerError {
    /// Whether this is a ledger-confirmed revert (as opposed to a failure
    /// to reach or address the contract at all).
    #[inline]
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, LedgerError::Reverted { .. })
    }
}

/// Failure while looking up a role in the external registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No entry exists for the requested key.
    #[error("no registry entry for key {0:?}")]
    NotFound(String),

    /// The registry call itself failed.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}
