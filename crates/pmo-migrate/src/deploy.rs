//! Proxy deployment and vault/strategy wiring.

use crate::error::{ConfigurationError, MigrationError, UnauthorizedError};
use pmo_ledger::{Address, CallData, ContractRef, LedgerClient, LedgerError, Value};
use serde::{Deserialize, Serialize};

/// Everything needed to deploy one proxy. Immutable; consumed by exactly
/// one [`DeploymentOrchestrator::deploy_proxy`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Address of the deployed, non-upgradeable logic contract.
    pub implementation: Address,
    /// The implementation's declared interface; the proxy is re-resolved
    /// through it after deployment.
    pub interface: String,
    /// Identity that will own the proxy's implementation binding.
    pub proxy_admin: Address,
    /// Initializer call, encoded against the implementation's interface and
    /// submitted atomically with proxy construction.
    pub initializer: CallData,
    /// Identity submitting the deployment.
    pub deployer: Address,
}

impl DeploymentSpec {
    /// Check the spec before anything is submitted.
    ///
    /// # Errors
    /// [`ConfigurationError::AdminIsDeployer`] when admin and deployer are
    /// the same identity, [`ConfigurationError::NullAddress`] for a null
    /// implementation or admin.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.implementation.is_zero() {
            return Err(ConfigurationError::NullAddress {
                field: "implementation",
            });
        }
        if self.proxy_admin.is_zero() {
            return Err(ConfigurationError::NullAddress {
                field: "proxy_admin",
            });
        }
        if self.proxy_admin == self.deployer {
            return Err(ConfigurationError::AdminIsDeployer {
                address: self.proxy_admin,
            });
        }
        Ok(())
    }
}

/// A proxy address paired with its current implementation.
///
/// Owned by the proxy admin on the ledger; the only mutation path is an
/// authorized upgrade call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyBinding {
    /// The persistent proxy address.
    pub proxy: Address,
    /// The implementation currently behind it.
    pub implementation: Address,
}

/// Result of a successful deployment: the binding plus the proxy
/// re-resolved through its implementation's declared interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedProxy {
    /// Proxy/implementation pair as confirmed by the ledger.
    pub binding: ProxyBinding,
    /// Reference for all subsequent interaction with the proxy.
    pub contract: ContractRef,
}

/// Builds and submits ordered deployment and wiring transactions.
#[derive(Debug)]
pub struct DeploymentOrchestrator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: LedgerClient + ?Sized> DeploymentOrchestrator<'a, C> {
    /// Orchestrate against the given ledger client.
    #[inline]
    #[must_use]
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Deploy a proxy bound to the spec's implementation, initializing it
    /// in the same transaction so it is never observably uninitialized.
    ///
    /// On success the proxy is re-resolved through the implementation's
    /// declared interface — a type-narrowing step; skipping it would send
    /// every later call through the generic proxy surface instead.
    ///
    /// # Errors
    /// Spec validation failures surface as [`ConfigurationError`]; a revert
    /// surfaces as [`LedgerError::Reverted`] and means no proxy exists —
    /// deployment is all-or-nothing per call.
    pub async fn deploy_proxy(&self, spec: DeploymentSpec) -> Result<DeployedProxy, MigrationError> {
        spec.validate()?;
        tracing::info!(
            implementation = %spec.implementation,
            admin = %spec.proxy_admin,
            initializer = %spec.initializer,
            "deploying proxy"
        );

        let proxy = self
            .client
            .deploy_proxy(
                spec.deployer,
                spec.implementation,
                spec.proxy_admin,
                spec.initializer,
            )
            .await?;

        let contract = ContractRef::new(proxy, spec.interface);
        tracing::info!(%contract, "proxy deployed and re-resolved");
        Ok(DeployedProxy {
            binding: ProxyBinding {
                proxy,
                implementation: spec.implementation,
            },
            contract,
        })
    }

    /// Point `vault` at `strategy` with a single transaction from `caller`.
    ///
    /// Idempotent only when the target strategy is unchanged; re-wiring
    /// over an active strategy is the vault's decision and any revert is
    /// surfaced as-is.
    ///
    /// # Errors
    /// [`UnauthorizedError`] when `caller` is not the vault's current
    /// governance (checked before submission), otherwise whatever the
    /// ledger reports.
    pub async fn wire(
        &self,
        vault: &ContractRef,
        strategy: Address,
        caller: Address,
    ) -> Result<(), MigrationError> {
        let governance = read_address(self.client, vault, "governance").await?;
        if caller != governance {
            return Err(UnauthorizedError {
                caller,
                expected: governance,
                authority: "vault governance".to_string(),
            }
            .into());
        }

        self.client
            .submit(
                caller,
                vault,
                CallData::new("setStrategy", vec![Value::Address(strategy)]),
            )
            .await?;
        tracing::info!(%vault, %strategy, "vault wired to strategy");
        Ok(())
    }
}

/// Read a zero-argument accessor that must yield an address.
pub(crate) async fn read_address<C: LedgerClient + ?Sized>(
    client: &C,
    target: &ContractRef,
    method: &str,
) -> Result<Address, LedgerError> {
    let value = client.read(target, CallData::view(method)).await?;
    value.as_address().ok_or_else(|| LedgerError::Decode {
        method: method.to_string(),
        value,
    })
}
