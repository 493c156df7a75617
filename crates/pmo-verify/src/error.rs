//! Error types for snapshot capture and invariant verification.

use pmo_ledger::LedgerError;

/// Failure while capturing or verifying observable contract state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// A named accessor failed during snapshot capture.
    ///
    /// Treated as severely as a value mismatch: the upgrade broke an
    /// interface the contract was expected to keep. Partial snapshots are
    /// never returned.
    #[error("field {field:?} could not be read: {source}")]
    FieldRead {
        /// The field whose accessor failed.
        field: String,
        /// The underlying ledger failure.
        source: LedgerError,
    },

    /// Verification produced mismatches where none were expected.
    ///
    /// The field names are the structured payload; callers decide whether a
    /// particular mismatch is fatal before this is raised.
    #[error("state not preserved across upgrade: {fields:?}")]
    InvariantMismatch {
        /// Fields whose values differ between the snapshots.
        fields: Vec<String>,
    },

    /// The precondition predicate did not hold before the action.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The postcondition predicate did not hold after the action.
    #[error("postcondition failed: {0}")]
    Postcondition(String),

    /// The transition action was expected to succeed but still reverted.
    #[error("transition action still fails: {source}")]
    ActionReverted {
        /// The revert the ledger reported.
        source: LedgerError,
    },

    /// A ledger read issued by a predicate failed.
    #[error("ledger call failed during verification: {0}")]
    Ledger(#[from] LedgerError),
}

impl VerifyError {
    /// The structured mismatch list, when this is an invariant mismatch.
    #[inline]
    #[must_use]
    pub fn mismatched_fields(&self) -> Option<&[String]> {
        match self {
            VerifyError::InvariantMismatch { fields } => Some(fields),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_exposes_field_list() {
        let err = VerifyError::InvariantMismatch {
            fields: vec!["lifeTimeEarned".to_string()],
        };
        assert_eq!(err.mismatched_fields(), Some(&["lifeTimeEarned".to_string()][..]));

        let err = VerifyError::Precondition("no shares".to_string());
        assert!(err.mismatched_fields().is_none());
    }

    #[test]
    fn field_read_names_the_field() {
        let err = VerifyError::FieldRead {
            field: "treasury".to_string(),
            source: LedgerError::UnknownMethod {
                interface: "Vault".to_string(),
                method: "treasury".to_string(),
            },
        };
        assert!(err.to_string().contains("treasury"));
    }
}
