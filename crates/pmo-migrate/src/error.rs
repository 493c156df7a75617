//! Error types for migration orchestration
//!
//! One failure taxonomy for the whole run: configuration problems abort
//! before anything is submitted, authorization and ledger rejections abort
//! the step they occur in, and verification failures end the run with the
//! mismatch data attached. Nothing is retried automatically — every failure
//! here is either a configuration problem or a ledger-confirmed rejection.

use crate::run::StageError;
use pmo_ledger::{Address, LedgerError, Role};
use pmo_verify::VerifyError;

/// Top-level error for a migration run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Unresolved role, registry outage, or malformed deployment spec.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A mutating call was attempted by the wrong identity.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] UnauthorizedError),

    /// The ledger rejected a submitted transaction or call.
    #[error("ledger rejected the operation: {0}")]
    Ledger(#[from] LedgerError),

    /// Snapshot capture or invariant verification failed.
    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// A run step was attempted out of order.
    #[error("run step out of order: {0}")]
    Stage(#[from] StageError),
}

impl MigrationError {
    /// Whether this is a configuration problem (caught before submission).
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, MigrationError::Configuration(_))
    }

    /// Whether a caller identity check failed.
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, MigrationError::Unauthorized(_))
    }

    /// The structured field list, when verification found an unexpected
    /// invariant mismatch.
    #[inline]
    #[must_use]
    pub fn mismatched_fields(&self) -> Option<&[String]> {
        match self {
            MigrationError::Verify(e) => e.mismatched_fields(),
            _ => None,
        }
    }
}

/// A deployment-blocking configuration problem. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A role resolved to the null address (or has no registry entry).
    #[error("role {role} resolved to the null address")]
    UnresolvedRole {
        /// The role that could not be bound.
        role: Role,
    },

    /// The registry lookup itself failed.
    #[error("registry unavailable: {reason}")]
    RegistryUnavailable {
        /// Collaborator-reported reason.
        reason: String,
    },

    /// Proxy admin and deployer are the same identity. An admin cannot
    /// call through its own proxy, so such a deployment would come up
    /// unusable for the deployer.
    #[error("proxy admin and deployer must differ (both {address})")]
    AdminIsDeployer {
        /// The shared identity.
        address: Address,
    },

    /// A required address in the spec is the null address.
    #[error("{field} must not be the null address")]
    NullAddress {
        /// Which spec field was null.
        field: &'static str,
    },
}

/// Caller lacks the identity a mutating call requires. Surfaced as-is,
/// never retried; no transaction is submitted when this is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("caller {caller} is not the {authority} ({expected})")]
pub struct UnauthorizedError {
    /// The identity that attempted the call.
    pub caller: Address,
    /// The identity the call requires.
    pub expected: Address,
    /// Human-readable name of the required authority.
    pub authority: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_classify_variants() {
        let err = MigrationError::from(ConfigurationError::UnresolvedRole {
            role: Role::Keeper,
        });
        assert!(err.is_configuration());
        assert!(!err.is_unauthorized());

        let err = MigrationError::from(UnauthorizedError {
            caller: Address::from_bytes([1u8; 20]),
            expected: Address::from_bytes([2u8; 20]),
            authority: "proxy-admin owner".to_string(),
        });
        assert!(err.is_unauthorized());
    }

    #[test]
    fn mismatch_fields_pass_through() {
        let err = MigrationError::from(VerifyError::InvariantMismatch {
            fields: vec!["strategy".to_string()],
        });
        assert_eq!(err.mismatched_fields(), Some(&["strategy".to_string()][..]));

        let err = MigrationError::from(LedgerError::Transport("down".to_string()));
        assert!(err.mismatched_fields().is_none());
    }

    #[test]
    fn unresolved_role_names_the_role() {
        let err = ConfigurationError::UnresolvedRole { role: Role::Keeper };
        assert_eq!(err.to_string(), "role keeper resolved to the null address");
    }
}
