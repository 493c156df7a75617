//! Behavioral transition checks around an upgrade.

use crate::error::VerifyError;
use pmo_ledger::{LedgerError, Value};
use std::future::Future;

/// Prove that an upgrade both left surrounding state intact and unblocked
/// the specific operation motivating it.
///
/// Runs three steps in order:
/// 1. `precondition` must hold (e.g. the user still holds shares);
/// 2. `action` — an operation that reverted before the upgrade — must now
///    complete without revert;
/// 3. `postcondition` must hold against the post-action state (e.g. the
///    underlying balance increased and the share balance is zero).
///
/// Predicates may issue ledger reads; their failures convert into
/// [`VerifyError::Ledger`] via `?`.
///
/// # Errors
/// [`VerifyError::Precondition`] / [`VerifyError::Postcondition`] when a
/// predicate returns `false`, [`VerifyError::ActionReverted`] when the
/// action still fails.
pub async fn verify_transition<Pre, PreFut, Act, ActFut, Post, PostFut>(
    precondition: Pre,
    action: Act,
    postcondition: Post,
) -> Result<(), VerifyError>
where
    Pre: FnOnce() -> PreFut,
    PreFut: Future<Output = Result<bool, VerifyError>>,
    Act: FnOnce() -> ActFut,
    ActFut: Future<Output = Result<Value, LedgerError>>,
    Post: FnOnce() -> PostFut,
    PostFut: Future<Output = Result<bool, VerifyError>>,
{
    if !precondition().await? {
        return Err(VerifyError::Precondition(
            "predicate did not hold before the action".to_string(),
        ));
    }

    match action().await {
        Ok(result) => {
            tracing::debug!(%result, "transition action confirmed");
        }
        Err(source) => {
            tracing::warn!(error = %source, "transition action still reverts");
            return Err(VerifyError::ActionReverted { source });
        }
    }

    if !postcondition().await? {
        return Err(VerifyError::Postcondition(
            "predicate did not hold after the action".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn yes() -> Result<bool, VerifyError> {
        Ok(true)
    }

    async fn no() -> Result<bool, VerifyError> {
        Ok(false)
    }

    async fn succeeds() -> Result<Value, LedgerError> {
        Ok(Value::Uint(1))
    }

    async fn reverts() -> Result<Value, LedgerError> {
        Err(LedgerError::Reverted {
            reason: "blocked".to_string(),
        })
    }

    #[tokio::test]
    async fn passes_when_all_steps_hold() {
        let result = verify_transition(yes, succeeds, yes).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fails_on_precondition() {
        let result = verify_transition(no, succeeds, yes).await;
        assert!(matches!(result, Err(VerifyError::Precondition(_))));
    }

    #[tokio::test]
    async fn fails_when_action_still_reverts() {
        let result = verify_transition(yes, reverts, yes).await;
        assert!(matches!(result, Err(VerifyError::ActionReverted { .. })));
    }

    #[tokio::test]
    async fn fails_on_postcondition() {
        let result = verify_transition(yes, succeeds, no).await;
        assert!(matches!(result, Err(VerifyError::Postcondition(_))));
    }

    #[tokio::test]
    async fn predicate_read_failures_propagate() {
        let result = verify_transition(
            || async {
                Err(VerifyError::from(LedgerError::Transport(
                    "node down".to_string(),
                )))
            },
            succeeds,
            yes,
        )
        .await;
        assert!(matches!(result, Err(VerifyError::Ledger(_))));
    }
}
