//! PMO Migration Orchestrator
//!
//! Orchestrates a multi-contract upgrade of an admin-controlled proxy pair
//! with strict ordering and no rollback primitive:
//!
//! - [`AddressResolver`]: Role → Address resolution against the registry,
//!   once per run
//! - [`DeploymentOrchestrator`]: atomic proxy deployment and vault/strategy
//!   wiring
//! - [`UpgradeExecutor`]: the single authorized mutation path for a
//!   [`ProxyBinding`]
//! - [`MigrationRun`]: the `Deployed → Snapshotted → Upgraded → Verified`
//!   state machine around an upgrade
//! - [`MigrationConfig`]: roles, snapshot fields, and expected changes for
//!   a run

mod config;
mod deploy;
mod error;
mod resolver;
mod run;
mod upgrade;

// Re-exports
pub use config::{vault_field_set, FeeSchedule, MigrationConfig};
pub use deploy::{DeployedProxy, DeploymentOrchestrator, DeploymentSpec, ProxyBinding};
pub use error::{ConfigurationError, MigrationError, UnauthorizedError};
pub use resolver::{AddressResolver, RoleBindings};
pub use run::{MigrationReport, MigrationRun, RunStage, StageError};
pub use upgrade::{UpgradeExecutor, PROXY_ADMIN_INTERFACE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
