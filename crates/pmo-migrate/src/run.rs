//! The migration-run state machine and driver.
//!
//! A single run walks `Deployed → Snapshotted → Upgraded → Verified` in
//! strict order; each step's input depends on the previous step's confirmed
//! output, so nothing executes concurrently and no transition may be
//! skipped. `Verified` is terminal — success or a documented mismatch list —
//! and there is no automatic retry or rollback transition. An operator moves
//! back to a known-good implementation by running a fresh upgrade.

use crate::deploy::ProxyBinding;
use crate::error::MigrationError;
use crate::upgrade::UpgradeExecutor;
use pmo_ledger::{Address, ContractRef, LedgerClient};
use pmo_verify::{snapshot, verify_preserved, StateSnapshot, VerifyError};

/// Stages of one migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// The subject proxy is live; nothing captured yet.
    Deployed,
    /// The before-upgrade snapshot is held.
    Snapshotted,
    /// The implementation swap is confirmed.
    Upgraded,
    /// The after-upgrade state has been compared. Terminal.
    Verified,
}

impl RunStage {
    /// The only stage this one may advance to.
    #[inline]
    #[must_use]
    pub fn next(self) -> Option<RunStage> {
        match self {
            RunStage::Deployed => Some(RunStage::Snapshotted),
            RunStage::Snapshotted => Some(RunStage::Upgraded),
            RunStage::Upgraded => Some(RunStage::Verified),
            RunStage::Verified => None,
        }
    }

    /// Whether the run has ended.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStage::Verified)
    }
}

/// A run step was attempted out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from:?} to {to:?}")]
pub struct StageError {
    /// Stage the run is in.
    pub from: RunStage,
    /// Stage the step would have entered.
    pub to: RunStage,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// State captured before the upgrade.
    pub before: StateSnapshot,
    /// State captured after the upgrade.
    pub after: StateSnapshot,
    /// Fields that changed across the upgrade. Only fields the caller
    /// allowed to change can appear here; anything else aborts the run.
    pub mismatches: Vec<String>,
}

impl MigrationReport {
    /// Whether the upgrade preserved every captured field.
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Drives one migration run against a subject contract.
///
/// The exclusive receiver on every step keeps snapshot reads from
/// interleaving with a pending upgrade: the before and after captures
/// straddle the upgrade's confirmation boundary exactly once. A stage only
/// commits once its step has confirmed, so a failed step leaves the run
/// where it was.
#[derive(Debug)]
pub struct MigrationRun<'a, C: ?Sized> {
    client: &'a C,
    subject: ContractRef,
    fields: Vec<String>,
    stage: RunStage,
    before: Option<StateSnapshot>,
}

impl<'a, C: LedgerClient + ?Sized> MigrationRun<'a, C> {
    /// Start a run over `subject`, capturing the given accessor fields.
    #[must_use]
    pub fn new(client: &'a C, subject: ContractRef, fields: Vec<String>) -> Self {
        Self {
            client,
            subject,
            fields,
            stage: RunStage::Deployed,
            before: None,
        }
    }

    /// The stage the run is currently in.
    #[inline]
    #[must_use]
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    fn check(&self, to: RunStage) -> Result<(), StageError> {
        if self.stage.next() == Some(to) {
            Ok(())
        } else {
            Err(StageError {
                from: self.stage,
                to,
            })
        }
    }

    /// Capture the before-upgrade snapshot.
    ///
    /// # Errors
    /// [`StageError`] out of order; [`VerifyError::FieldRead`] if any
    /// accessor fails (no partial snapshot is kept).
    pub async fn capture_baseline(&mut self) -> Result<&StateSnapshot, MigrationError> {
        self.check(RunStage::Snapshotted)?;
        let captured = snapshot(self.client, &self.subject, &self.fields).await?;
        tracing::info!(subject = %self.subject, fields = captured.len(), "baseline captured");
        self.stage = RunStage::Snapshotted;
        Ok(self.before.insert(captured))
    }

    /// Swap the subject's implementation through the given executor.
    ///
    /// # Errors
    /// [`StageError`] out of order, plus whatever the executor reports; the
    /// run aborts at this step on any failure and issues nothing further.
    pub async fn upgrade_via(
        &mut self,
        executor: &UpgradeExecutor<'_, C>,
        new_implementation: Address,
        caller: Address,
    ) -> Result<ProxyBinding, MigrationError> {
        self.check(RunStage::Upgraded)?;
        let binding = executor
            .upgrade(self.subject.address, new_implementation, caller)
            .await?;
        self.stage = RunStage::Upgraded;
        Ok(binding)
    }

    /// Capture the after-upgrade snapshot and compare it to the baseline.
    ///
    /// Fields listed in `allowed_changes` may differ (they are expected
    /// side effects of the new logic) and stay in the report's mismatch
    /// list as documentation.
    ///
    /// # Errors
    /// [`VerifyError::InvariantMismatch`] carrying every field that changed
    /// without being allowed to; [`VerifyError::FieldRead`] if the upgrade
    /// broke an accessor; [`StageError`] out of order.
    pub async fn verify(
        &mut self,
        allowed_changes: &[String],
    ) -> Result<MigrationReport, MigrationError> {
        self.check(RunStage::Verified)?;
        let Some(before) = self.before.clone() else {
            // Unreachable when stages committed in order; refuse rather
            // than compare against nothing.
            return Err(StageError {
                from: self.stage,
                to: RunStage::Verified,
            }
            .into());
        };
        let after = snapshot(self.client, &self.subject, &self.fields).await?;

        let mismatches = verify_preserved(&before, &after);
        let unexpected: Vec<String> = mismatches
            .iter()
            .filter(|field| !allowed_changes.contains(field))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            tracing::error!(fields = ?unexpected, "upgrade failed to preserve state");
            return Err(VerifyError::InvariantMismatch { fields: unexpected }.into());
        }

        self.stage = RunStage::Verified;
        tracing::info!(
            subject = %self.subject,
            expected_changes = mismatches.len(),
            "upgrade verified"
        );
        Ok(MigrationReport {
            before,
            after,
            mismatches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_in_one_order() {
        assert_eq!(RunStage::Deployed.next(), Some(RunStage::Snapshotted));
        assert_eq!(RunStage::Snapshotted.next(), Some(RunStage::Upgraded));
        assert_eq!(RunStage::Upgraded.next(), Some(RunStage::Verified));
        assert_eq!(RunStage::Verified.next(), None);
    }

    #[test]
    fn verified_is_terminal() {
        assert!(RunStage::Verified.is_terminal());
        assert!(!RunStage::Snapshotted.is_terminal());
    }

    #[test]
    fn stage_error_names_both_ends() {
        let err = StageError {
            from: RunStage::Deployed,
            to: RunStage::Upgraded,
        };
        assert_eq!(err.to_string(), "cannot move from Deployed to Upgraded");
    }

    #[test]
    fn empty_report_passes() {
        let report = MigrationReport {
            before: StateSnapshot::default(),
            after: StateSnapshot::default(),
            mismatches: Vec::new(),
        };
        assert!(report.passed());
    }
}
