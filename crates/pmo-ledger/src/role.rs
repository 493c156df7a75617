//! Symbolic permissioned roles resolved against an external registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbolic role bound to a concrete address at orchestration time.
///
/// Bindings are looked up once per run and never cached across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Day-to-day owner of the deployed contracts.
    Governance,
    /// Author/operator of the strategy.
    Strategist,
    /// Emergency pauser.
    Guardian,
    /// Automated maintenance caller.
    Keeper,
    /// Identity allowed to swap proxy implementations.
    ProxyAdmin,
    /// Sink for emitted rewards.
    RewardsRecipient,
}

impl Role {
    /// The lookup key used against the external registry.
    #[inline]
    #[must_use]
    pub fn registry_key(&self) -> &'static str {
        match self {
            Role::Governance => "governance",
            Role::Strategist => "strategist",
            Role::Guardian => "guardian",
            Role::Keeper => "keeper",
            Role::ProxyAdmin => "proxyAdmin",
            Role::RewardsRecipient => "rewardsRecipient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.registry_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_are_stable() {
        assert_eq!(Role::Governance.registry_key(), "governance");
        assert_eq!(Role::ProxyAdmin.registry_key(), "proxyAdmin");
        assert_eq!(Role::RewardsRecipient.registry_key(), "rewardsRecipient");
    }

    #[test]
    fn display_matches_registry_key() {
        assert_eq!(Role::Keeper.to_string(), "keeper");
    }

    #[test]
    fn role_serde_is_camel_case() {
        let json = serde_json::to_string(&Role::ProxyAdmin).unwrap();
        assert_eq!(json, "\"proxyAdmin\"");
    }
}
