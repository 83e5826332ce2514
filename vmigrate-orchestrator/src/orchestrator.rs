use crate::catalog::{Catalog, Claim};
use crate::error::{OrchestratorError, Result, RunFailure};
use crate::models::{MigrationState, Workload};
use crate::runner::{MigrationRunner, RunOutcome};
use crate::transfer::TransferExecutor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, info, instrument, Instrument};
use utoipa::ToSchema;

/// Result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunReport {
    pub migration_id: String,
    pub migration_state: MigrationState,
    /// Workload now bound to the migration target.
    pub target_vm: Workload,
}

/// Entry point for running migrations.
///
/// Runs of the same migration are mutually exclusive; runs of different
/// migrations proceed independently.
#[derive(Clone)]
pub struct MigrationOrchestrator {
    runner: Arc<MigrationRunner>,
    locks: Arc<RunLocks>,
}

impl MigrationOrchestrator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        executor: Arc<dyn TransferExecutor>,
        transfer_timeout: Duration,
    ) -> Self {
        Self {
            runner: Arc::new(MigrationRunner::new(catalog, executor, transfer_timeout)),
            locks: Arc::new(RunLocks::default()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        self.runner.catalog()
    }

    /// Run a migration to completion.
    ///
    /// Fails with `NotFound` for an unknown id and with `IneligibleState`,
    /// without touching the record, unless it is `not_started` or `error`.
    /// The claim and the run execute together on their own task, so dropping
    /// the returned future never leaves a migration in `running`.
    #[instrument(skip(self))]
    pub async fn execute(&self, migration_id: &str) -> Result<RunReport> {
        let orchestrator = self.clone();
        let id = migration_id.to_string();
        let task = async move { orchestrator.claim_and_run(id).await };

        match tokio::spawn(task.in_current_span()).await {
            Ok(result) => result,
            Err(e) => {
                // Run failures are recorded inside the task; only the claim can end here.
                error!("migration claim task ended abnormally: {}", e);
                Err(OrchestratorError::RunFailed(RunFailure::Aborted(
                    e.to_string(),
                )))
            }
        }
    }

    async fn claim_and_run(&self, migration_id: String) -> Result<RunReport> {
        let migration = {
            let handle = self.locks.handle(&migration_id);
            let claim = {
                let _guard = handle.lock().await;
                self.runner.begin(&migration_id).await
            };
            self.locks.release(&migration_id, handle);

            match claim? {
                Claim::Claimed(migration) => migration,
                Claim::Ineligible(state) => {
                    return Err(OrchestratorError::IneligibleState {
                        id: migration_id,
                        state,
                    })
                }
            }
        };

        info!("migration claimed, starting run");

        let runner = Arc::clone(&self.runner);
        let run = async move { runner.run(migration).await };
        let outcome = match tokio::spawn(run.in_current_span()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("migration run task ended abnormally: {}", e);
                let failure = RunFailure::Aborted(e.to_string());
                self.runner.fail(&migration_id, &failure).await;
                RunOutcome::Failed(failure)
            }
        };

        match outcome {
            RunOutcome::Succeeded { target_vm } => Ok(RunReport {
                migration_id,
                migration_state: MigrationState::Success,
                target_vm,
            }),
            RunOutcome::Failed(failure) => Err(OrchestratorError::RunFailed(failure)),
        }
    }

    /// Current lifecycle state; never mutates the migration.
    pub async fn get_state(&self, migration_id: &str) -> Result<MigrationState> {
        let migration = self.catalog().get_migration(migration_id).await?;
        Ok(migration.migration_state)
    }

    /// Move migrations persisted as `running` to `error`.
    ///
    /// Only meaningful at startup, before this process has claimed anything:
    /// such records belong to a run whose process died.
    pub async fn recover_interrupted(&self) -> Result<Vec<String>> {
        let stranded = self
            .catalog()
            .list_migrations_in_state(MigrationState::Running)
            .await?;

        let mut recovered = Vec::with_capacity(stranded.len());
        for migration in stranded {
            self.catalog()
                .set_migration_state(
                    &migration.id,
                    MigrationState::Error,
                    Some(RunFailure::Aborted("interrupted".to_string()).to_string()),
                )
                .await?;
            recovered.push(migration.id);
        }

        Ok(recovered)
    }
}

/// Per-migration claim locks.
///
/// Entries are created on demand and dropped once no caller holds or waits
/// on them. The outer mutex is only held to look up an entry, never across
/// an await.
#[derive(Default)]
struct RunLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RunLocks {
    fn handle(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    fn release(&self, id: &str, handle: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus ours means nobody else is waiting.
        if Arc::strong_count(&handle) == 2 {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_entries_are_dropped_after_release() {
        let locks = RunLocks::default();

        let first = locks.handle("m-1");
        let second = locks.handle("m-1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(locks.len(), 1);

        locks.release("m-1", first);
        assert_eq!(locks.len(), 1, "still referenced by the second caller");

        locks.release("m-1", second);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn different_ids_get_different_locks() {
        let locks = RunLocks::default();

        let a = locks.handle("a");
        let b = locks.handle("b");

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len(), 2);
    }
}
