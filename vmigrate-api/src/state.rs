use crate::config::Config;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use vmigrate_orchestrator::{MigrationOrchestrator, SimulatedTransfer, SqliteCatalog, TransferExecutor};

#[derive(Clone)]
pub struct AppState {
    pub catalog: SqliteCatalog,
    pub orchestrator: MigrationOrchestrator,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self::with_executor(
            pool,
            Arc::new(SimulatedTransfer::new(config.transfer_delay())),
            config.transfer_timeout(),
        )
    }

    /// Build the state around a specific transfer executor.
    pub fn with_executor(
        pool: SqlitePool,
        executor: Arc<dyn TransferExecutor>,
        transfer_timeout: Duration,
    ) -> Self {
        let catalog = SqliteCatalog::new(pool);

        Self {
            orchestrator: MigrationOrchestrator::new(
                Arc::new(catalog.clone()),
                executor,
                transfer_timeout,
            ),
            catalog,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.catalog.pool()
    }
}
