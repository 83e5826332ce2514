//! Migration state machine
//!
//! `begin` performs the `not_started | error -> running` transition; `run`
//! does the work and always leaves the migration in `success` or `error`.

use crate::catalog::{Catalog, Claim};
use crate::error::{Result, RunFailure};
use crate::models::{Migration, MigrationState, Workload};
use crate::provision::{provision, ProvisionOutcome};
use crate::reconcile::reconcile;
use crate::transfer::{TransferExecutor, TransferJob};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { target_vm: Workload },
    Failed(RunFailure),
}

pub struct MigrationRunner {
    catalog: Arc<dyn Catalog>,
    executor: Arc<dyn TransferExecutor>,
    transfer_timeout: Duration,
}

impl MigrationRunner {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        executor: Arc<dyn TransferExecutor>,
        transfer_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            executor,
            transfer_timeout,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    /// Move the migration to `running` if it may start, persisting the new
    /// state before any work begins.
    pub async fn begin(&self, migration_id: &str) -> Result<Claim> {
        self.catalog.claim_for_run(migration_id).await
    }

    /// Drive a claimed migration to a terminal state.
    #[instrument(skip(self, migration), fields(migration_id = %migration.id))]
    pub async fn run(&self, migration: Migration) -> RunOutcome {
        let outcome = match self.drive(&migration).await {
            Ok(workload) => RunOutcome::Succeeded { target_vm: workload },
            Err(failure) => RunOutcome::Failed(failure),
        };

        match &outcome {
            RunOutcome::Succeeded { target_vm } => {
                if let Err(e) = self
                    .catalog
                    .set_migration_state(&migration.id, MigrationState::Success, None)
                    .await
                {
                    // Binding is committed but `success` was not recorded.
                    let failure = RunFailure::ProvisioningFault(e.to_string());
                    self.fail(&migration.id, &failure).await;
                    return RunOutcome::Failed(failure);
                }
                info!(target_vm = %target_vm.id, "migration succeeded");
            }
            RunOutcome::Failed(failure) => {
                self.fail(&migration.id, failure).await;
            }
        }

        outcome
    }

    /// Record `error` for a run that could not complete.
    pub async fn fail(&self, migration_id: &str, failure: &RunFailure) {
        warn!(migration_id, "migration failed: {}", failure);

        if let Err(e) = self
            .catalog
            .set_migration_state(migration_id, MigrationState::Error, Some(failure.to_string()))
            .await
        {
            error!(
                migration_id,
                "could not record error state, migration left running: {}", e
            );
        }
    }

    async fn drive(&self, migration: &Migration) -> std::result::Result<Workload, RunFailure> {
        if migration.selected_mount_points.is_empty() {
            return Err(RunFailure::InvalidMigration(
                "no mount points selected".to_string(),
            ));
        }

        let source_id = migration
            .source
            .as_deref()
            .ok_or_else(|| RunFailure::InvalidMigration("source workload is not set".to_string()))?;
        let target_id = migration
            .target
            .as_deref()
            .ok_or_else(|| RunFailure::InvalidMigration("migration target is not set".to_string()))?;

        let source = self
            .catalog
            .get_workload(source_id)
            .await
            .map_err(RunFailure::from_catalog)?;
        let target = self
            .catalog
            .get_migration_target(target_id)
            .await
            .map_err(RunFailure::from_catalog)?;

        let job = TransferJob {
            migration,
            source: &source,
            target: &target,
        };
        match tokio::time::timeout(self.transfer_timeout, self.executor.transfer(job)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RunFailure::TransferFault(format!("{:#}", e))),
            Err(_) => return Err(RunFailure::TransferTimedOut(self.transfer_timeout)),
        }

        // The transfer may take long; reconcile against the storage the
        // source has now, not when the run started.
        let source = self
            .catalog
            .get_workload(source_id)
            .await
            .map_err(RunFailure::from_catalog)?;

        let reconciliation = reconcile(&source.storage, &migration.selected_mount_points);

        match provision(self.catalog.as_ref(), &target, &source, reconciliation).await {
            ProvisionOutcome::Bound(workload) => Ok(workload),
            ProvisionOutcome::Failed(failure) => Err(failure),
        }
    }
}
