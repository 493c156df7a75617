//! Point-in-time capture of observable contract state.

use crate::error::VerifyError;
use futures::future::join_all;
use indexmap::IndexMap;
use pmo_ledger::{CallData, ContractRef, LedgerClient, Value};
use std::fmt;

/// Ordered field-name → value mapping captured from a contract.
///
/// Two snapshots are comparable only if captured against the same field
/// set; [`verify_preserved`] reports any divergence as data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    fields: IndexMap<String, Value>,
}

impl StateSnapshot {
    /// Build a snapshot directly from field/value pairs.
    ///
    /// Capture order follows iteration order of the input.
    #[must_use]
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The observed value for a field, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field names in capture order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of captured fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the snapshot is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Capture the named accessor fields of `contract`, in the order given.
///
/// Each field is one zero-argument read-only call. Reads carry no mutation
/// risk, so they are dispatched concurrently; the resulting mapping — and
/// the choice of which failure wins — still follows `fields` order, so
/// captures are deterministic.
///
/// # Errors
/// [`VerifyError::FieldRead`] naming the first field (in `fields` order)
/// whose accessor failed. No partial snapshot is returned.
pub async fn snapshot<C>(
    client: &C,
    contract: &ContractRef,
    fields: &[String],
) -> Result<StateSnapshot, VerifyError>
where
    C: LedgerClient + ?Sized,
{
    let reads = fields
        .iter()
        .map(|field| client.read(contract, CallData::view(field.clone())));
    let observed = join_all(reads).await;

    let mut captured = IndexMap::with_capacity(fields.len());
    for (field, result) in fields.iter().zip(observed) {
        match result {
            Ok(value) => {
                captured.insert(field.clone(), value);
            }
            Err(source) => {
                tracing::warn!(%contract, field = %field, error = %source, "snapshot field read failed");
                return Err(VerifyError::FieldRead {
                    field: field.clone(),
                    source,
                });
            }
        }
    }

    tracing::debug!(%contract, fields = captured.len(), "captured state snapshot");
    Ok(StateSnapshot { fields: captured })
}

/// Compare two snapshots field by field and return the mismatching names.
///
/// Every field of `before` is checked against `after` with exact equality,
/// in capture order; a field missing from `after` counts as a mismatch. An
/// empty list is the success condition. Mismatches are data, not errors —
/// the caller decides whether any of them is fatal.
#[must_use]
pub fn verify_preserved(before: &StateSnapshot, after: &StateSnapshot) -> Vec<String> {
    let mut mismatches = Vec::new();
    for (field, expected) in &before.fields {
        if after.get(field) != Some(expected) {
            mismatches.push(field.clone());
        }
    }
    if !mismatches.is_empty() {
        tracing::warn!(?mismatches, "snapshot comparison found divergent fields");
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_ledger::Address;

    fn sample() -> StateSnapshot {
        StateSnapshot::from_fields([
            ("strategy", Value::Address(Address::from_bytes([1u8; 20]))),
            ("guardian", Value::Address(Address::from_bytes([2u8; 20]))),
            ("lifeTimeEarned", Value::Uint(100)),
        ])
    }

    #[test]
    fn preserved_against_itself() {
        let snap = sample();
        assert!(verify_preserved(&snap, &snap).is_empty());
    }

    #[test]
    fn single_field_change_is_reported() {
        let before = sample();
        let mut after_fields: Vec<(String, Value)> = before
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        after_fields[2].1 = Value::Uint(150);
        let after = StateSnapshot::from_fields(after_fields);

        assert_eq!(verify_preserved(&before, &after), vec!["lifeTimeEarned"]);
    }

    #[test]
    fn missing_field_is_a_mismatch() {
        let before = sample();
        let after = StateSnapshot::from_fields([(
            "strategy",
            Value::Address(Address::from_bytes([1u8; 20])),
        )]);

        assert_eq!(verify_preserved(&before, &after), vec!["guardian", "lifeTimeEarned"]);
    }

    #[test]
    fn extra_after_fields_are_ignored() {
        let before = StateSnapshot::from_fields([("guardian", Value::Uint(1))]);
        let after = StateSnapshot::from_fields([
            ("guardian", Value::Uint(1)),
            ("newField", Value::Uint(9)),
        ]);

        assert!(verify_preserved(&before, &after).is_empty());
    }

    #[test]
    fn snapshot_display_is_ordered() {
        let snap = StateSnapshot::from_fields([
            ("a", Value::Uint(1)),
            ("b", Value::Bool(false)),
        ]);
        assert_eq!(snap.to_string(), "{a: 1, b: false}");
    }
}
