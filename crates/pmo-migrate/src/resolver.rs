//! Role resolution against the external registry.
//!
//! A late-bound configuration lookup executed once per run. Roles are never
//! cached across runs and a missing binding is a deployment-blocking
//! configuration error, not a transient failure — nothing here retries.

use crate::error::ConfigurationError;
use indexmap::IndexMap;
use pmo_ledger::{Address, RegistryError, Role, RoleRegistry};

/// Complete Role → Address mapping for one run.
///
/// Either every requested role is bound to a non-null address or the
/// resolver fails; partial mappings do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleBindings {
    bindings: IndexMap<Role, Address>,
}

impl RoleBindings {
    /// The bound address for a role, if it was requested.
    #[inline]
    #[must_use]
    pub fn get(&self, role: Role) -> Option<Address> {
        self.bindings.get(&role).copied()
    }

    /// The bound address for a role that must be present.
    ///
    /// # Errors
    /// [`ConfigurationError::UnresolvedRole`] if the role was not part of
    /// the resolved set.
    pub fn require(&self, role: Role) -> Result<Address, ConfigurationError> {
        self.get(role)
            .ok_or(ConfigurationError::UnresolvedRole { role })
    }

    /// Iterate bindings in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Address)> + '_ {
        self.bindings.iter().map(|(r, a)| (*r, *a))
    }

    /// Number of bound roles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no roles are bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(Role, Address)> for RoleBindings {
    fn from_iter<T: IntoIterator<Item = (Role, Address)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Resolves symbolic roles to concrete addresses via the registry.
#[derive(Debug)]
pub struct AddressResolver<'a, R: ?Sized> {
    registry: &'a R,
}

impl<'a, R: RoleRegistry + ?Sized> AddressResolver<'a, R> {
    /// Resolve against the given registry.
    #[inline]
    #[must_use]
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Query the registry once per role and return the complete mapping.
    ///
    /// # Errors
    /// [`ConfigurationError::UnresolvedRole`] naming the first role whose
    /// entry is missing or null, [`ConfigurationError::RegistryUnavailable`]
    /// if a lookup itself fails. No partial mapping is ever returned.
    pub async fn resolve(&self, roles: &[Role]) -> Result<RoleBindings, ConfigurationError> {
        let mut bindings = IndexMap::with_capacity(roles.len());
        for &role in roles {
            let address = match self.registry.get(role.registry_key()).await {
                Ok(address) => address,
                Err(RegistryError::NotFound(_)) => {
                    return Err(ConfigurationError::UnresolvedRole { role });
                }
                Err(RegistryError::Unavailable(reason)) => {
                    return Err(ConfigurationError::RegistryUnavailable { reason });
                }
            };
            if address.is_zero() {
                return Err(ConfigurationError::UnresolvedRole { role });
            }
            tracing::debug!(%role, %address, "resolved role binding");
            bindings.insert(role, address);
        }
        tracing::info!(roles = bindings.len(), "resolved all role bindings");
        Ok(RoleBindings { bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmo_test_utils::{addr, InMemoryLedger};

    #[tokio::test]
    async fn resolves_complete_mapping() {
        let ledger = InMemoryLedger::new()
            .with_role("governance", addr(1))
            .with_role("guardian", addr(2))
            .with_role("keeper", addr(3))
            .with_role("proxyAdmin", addr(4));

        let resolver = AddressResolver::new(&ledger);
        let bindings = resolver
            .resolve(&[Role::Governance, Role::Guardian, Role::Keeper, Role::ProxyAdmin])
            .await
            .unwrap();

        assert_eq!(bindings.len(), 4);
        assert_eq!(bindings.get(Role::Keeper), Some(addr(3)));
        assert_eq!(bindings.require(Role::ProxyAdmin).unwrap(), addr(4));
    }

    #[tokio::test]
    async fn null_binding_names_the_role() {
        let ledger = InMemoryLedger::new()
            .with_role("governance", addr(1))
            .with_role("keeper", Address::ZERO);

        let resolver = AddressResolver::new(&ledger);
        let err = resolver
            .resolve(&[Role::Governance, Role::Keeper])
            .await
            .unwrap_err();

        assert_eq!(err, ConfigurationError::UnresolvedRole { role: Role::Keeper });
    }

    #[tokio::test]
    async fn missing_entry_is_an_unresolved_role() {
        let ledger = InMemoryLedger::new().with_role("governance", addr(1));

        let resolver = AddressResolver::new(&ledger);
        let err = resolver
            .resolve(&[Role::Governance, Role::Guardian])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::UnresolvedRole {
                role: Role::Guardian
            }
        );
    }

    #[tokio::test]
    async fn registry_outage_is_not_an_unresolved_role() {
        let ledger = InMemoryLedger::new().with_role("governance", addr(1));
        ledger.fail_registry("rpc node unreachable");

        let resolver = AddressResolver::new(&ledger);
        let err = resolver.resolve(&[Role::Governance]).await.unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::RegistryUnavailable {
                reason: "rpc node unreachable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_role_set_resolves_empty() {
        let ledger = InMemoryLedger::new();
        let resolver = AddressResolver::new(&ledger);
        let bindings = resolver.resolve(&[]).await.unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn require_on_missing_role_fails() {
        let bindings: RoleBindings = [(Role::Governance, addr(1))].into_iter().collect();
        assert!(bindings.require(Role::Guardian).is_err());
    }
}
