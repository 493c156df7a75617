//! Run configuration
//!
//! What a migration run needs declared up front: which roles must resolve,
//! which accessor fields make up the invariant snapshot, and which of them
//! are expected to change as a side effect of the new logic.

use pmo_ledger::{Role, Value};
use serde::{Deserialize, Serialize};

/// Configuration for one migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Roles that must resolve to non-null addresses before anything is
    /// submitted.
    pub required_roles: Vec<Role>,
    /// Accessor fields captured before and after the upgrade.
    pub snapshot_fields: Vec<String>,
    /// Fields allowed to differ across the upgrade.
    pub allowed_changes: Vec<String>,
}

impl MigrationConfig {
    /// Create the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different required-role set.
    #[inline]
    #[must_use]
    pub fn with_required_roles(mut self, roles: Vec<Role>) -> Self {
        self.required_roles = roles;
        self
    }

    /// With a different snapshot field set.
    #[inline]
    #[must_use]
    pub fn with_snapshot_fields(mut self, fields: Vec<String>) -> Self {
        self.snapshot_fields = fields;
        self
    }

    /// With fields that are expected to change.
    #[inline]
    #[must_use]
    pub fn with_allowed_changes(mut self, fields: Vec<String>) -> Self {
        self.allowed_changes = fields;
        self
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            required_roles: vec![
                Role::Governance,
                Role::Guardian,
                Role::Keeper,
                Role::ProxyAdmin,
            ],
            snapshot_fields: vault_field_set(),
            allowed_changes: Vec::new(),
        }
    }
}

/// The vault's observable field set: role bindings, harvest accounting,
/// fee parameters and their configured maxima.
#[must_use]
pub fn vault_field_set() -> Vec<String> {
    [
        "strategy",
        "guardian",
        "treasury",
        "rewardsRecipient",
        "lifeTimeEarned",
        "lastHarvestedAt",
        "lastHarvestAmount",
        "assetsAtLastHarvest",
        "performanceFeeGovernance",
        "performanceFeeStrategist",
        "withdrawalFee",
        "managementFee",
        "maxPerformanceFee",
        "maxWithdrawalFee",
        "maxManagementFee",
        "toEarnBps",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Fee parameters for a vault initializer, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Performance fee paid to governance.
    pub performance_governance: u64,
    /// Performance fee paid to the strategist.
    pub performance_strategist: u64,
    /// Fee charged on withdrawal.
    pub withdrawal: u64,
    /// Flat management fee.
    pub management: u64,
}

impl FeeSchedule {
    /// The four-entry fee list the vault initializer expects.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::List(vec![
            Value::Uint(u128::from(self.performance_governance)),
            Value::Uint(u128::from(self.performance_strategist)),
            Value::Uint(u128::from(self.withdrawal)),
            Value::Uint(u128::from(self.management)),
        ])
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        // 20% performance to governance, 0.1% withdrawal, nothing else.
        Self {
            performance_governance: 2_000,
            performance_strategist: 0,
            withdrawal: 10,
            management: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_requires_the_core_roles() {
        let config = MigrationConfig::new();
        assert!(config.required_roles.contains(&Role::ProxyAdmin));
        assert_eq!(config.snapshot_fields.len(), 16);
        assert!(config.allowed_changes.is_empty());
    }

    #[test]
    fn builders_replace_fields() {
        let config = MigrationConfig::new()
            .with_required_roles(vec![Role::Governance])
            .with_allowed_changes(vec!["lifeTimeEarned".to_string()]);
        assert_eq!(config.required_roles, vec![Role::Governance]);
        assert_eq!(config.allowed_changes, vec!["lifeTimeEarned"]);
    }

    #[test]
    fn fee_schedule_encodes_in_initializer_order() {
        let fees = FeeSchedule::default().as_value();
        assert_eq!(
            fees,
            Value::List(vec![
                Value::Uint(2_000),
                Value::Uint(0),
                Value::Uint(10),
                Value::Uint(0),
            ])
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = MigrationConfig::new()
            .with_allowed_changes(vec!["lastHarvestedAt".to_string()]);
        let json = serde_json::to_string(&config).unwrap();
        let back: MigrationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
