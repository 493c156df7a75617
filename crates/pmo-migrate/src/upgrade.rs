//! Authorized implementation swaps through the proxy-admin contract.

use crate::deploy::{read_address, ProxyBinding};
use crate::error::{MigrationError, UnauthorizedError};
use pmo_ledger::{Address, CallData, ContractRef, LedgerClient, Value};

/// Interface the proxy-admin contract is addressed through.
pub const PROXY_ADMIN_INTERFACE: &str = "ProxyAdmin";

/// Submits authorized implementation swaps for existing proxies.
///
/// This is the single point of mutation for a [`ProxyBinding`]. There is no
/// rollback primitive: moving back to a known-good implementation means a
/// second [`UpgradeExecutor::upgrade`] call pointing at it. Upgrade history
/// lives on the ledger, not here.
#[derive(Debug)]
pub struct UpgradeExecutor<'a, C: ?Sized> {
    client: &'a C,
    admin: ContractRef,
}

impl<'a, C: LedgerClient + ?Sized> UpgradeExecutor<'a, C> {
    /// Execute upgrades through the proxy-admin at `admin`.
    #[inline]
    #[must_use]
    pub fn new(client: &'a C, admin: Address) -> Self {
        Self {
            client,
            admin: ContractRef::new(admin, PROXY_ADMIN_INTERFACE),
        }
    }

    /// The proxy-admin's current owner.
    ///
    /// # Errors
    /// Whatever the ledger reports for the `owner()` read.
    pub async fn owner(&self) -> Result<Address, MigrationError> {
        Ok(read_address(self.client, &self.admin, "owner").await?)
    }

    /// Swap `proxy`'s implementation to `new_implementation`.
    ///
    /// # Errors
    /// [`UnauthorizedError`] when `caller` is not the proxy-admin's owner —
    /// checked before submission, so the binding is untouched. A ledger
    /// revert likewise leaves the binding unchanged.
    pub async fn upgrade(
        &self,
        proxy: Address,
        new_implementation: Address,
        caller: Address,
    ) -> Result<ProxyBinding, MigrationError> {
        let owner = self.owner().await?;
        if caller != owner {
            tracing::warn!(%caller, %owner, %proxy, "upgrade attempted by non-owner");
            return Err(UnauthorizedError {
                caller,
                expected: owner,
                authority: "proxy-admin owner".to_string(),
            }
            .into());
        }

        self.client
            .submit(
                caller,
                &self.admin,
                CallData::new(
                    "upgrade",
                    vec![Value::Address(proxy), Value::Address(new_implementation)],
                ),
            )
            .await?;
        tracing::info!(%proxy, implementation = %new_implementation, "proxy upgraded");
        Ok(ProxyBinding {
            proxy,
            implementation: new_implementation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_test_utils::{addr, Implementation, InMemoryLedger, STRATEGY_INTERFACE};

    #[tokio::test]
    async fn owner_is_read_through_the_admin_interface() {
        let ledger = InMemoryLedger::new();
        let admin = ledger.create_proxy_admin(addr(9));

        let executor = UpgradeExecutor::new(&ledger, admin);
        assert_eq!(executor.owner().await.unwrap(), addr(9));
    }

    #[tokio::test]
    async fn non_owner_is_rejected_before_submission() {
        let ledger = InMemoryLedger::new();
        let admin = ledger.create_proxy_admin(addr(9));
        ledger.register_implementation(addr(20), Implementation::new(STRATEGY_INTERFACE));

        let executor = UpgradeExecutor::new(&ledger, admin);
        let err = executor.upgrade(addr(50), addr(20), addr(7)).await.unwrap_err();

        assert!(err.is_unauthorized());
    }
}
