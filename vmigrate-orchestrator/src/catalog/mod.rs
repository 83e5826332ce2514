//! Resource catalog
//!
//! The [`Catalog`] trait is the persistence contract the migration engine
//! depends on. [`SqliteCatalog`] implements it on top of the sqlx pool and
//! also carries the administrative CRUD operations used by the HTTP layer.

mod admin;
mod sqlite;

pub use sqlite::SqliteCatalog;

use crate::error::Result;
use crate::models::{Migration, MigrationState, MigrationTarget, MountPoint, NewWorkload, Workload};
use async_trait::async_trait;

/// Result of trying to move a migration into `running`.
#[derive(Debug, Clone)]
pub enum Claim {
    /// The migration was `not_started` or `error` and is now `running`.
    Claimed(Migration),
    /// The migration was left untouched because it is in this state.
    Ineligible(MigrationState),
}

/// Persistence operations required by the migration engine.
///
/// Every getter fails with `OrchestratorError::NotFound` when the record does
/// not exist. The trait is object-safe and is shared as `Arc<dyn Catalog>`.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_workload(&self, id: &str) -> Result<Workload>;

    async fn get_mount_point(&self, id: &str) -> Result<MountPoint>;

    async fn get_migration_target(&self, id: &str) -> Result<MigrationTarget>;

    async fn get_migration(&self, id: &str) -> Result<Migration>;

    /// Insert a workload together with its storage links.
    async fn create_workload(&self, workload: NewWorkload) -> Result<Workload>;

    /// Point `target.target_vm` at an existing workload.
    async fn set_target_vm(&self, target_id: &str, workload_id: &str) -> Result<()>;

    /// Create a workload and bind it to the target in one transaction.
    ///
    /// Either both the workload and the binding are committed or neither is.
    async fn bind_new_workload(&self, target_id: &str, workload: NewWorkload) -> Result<Workload>;

    /// Persist a state transition, replacing `last_error`.
    async fn set_migration_state(
        &self,
        id: &str,
        state: MigrationState,
        last_error: Option<String>,
    ) -> Result<()>;

    /// Atomically move `not_started | error` to `running`.
    async fn claim_for_run(&self, id: &str) -> Result<Claim>;

    async fn list_migrations_in_state(&self, state: MigrationState) -> Result<Vec<Migration>>;
}
