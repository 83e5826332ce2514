//! Long-running remote work performed by a migration run.
//!
//! The engine only needs "move the data, eventually succeed or fail". Real
//! cloud integrations implement [`TransferExecutor`]; the service ships with
//! [`SimulatedTransfer`], which waits a fixed delay.

use crate::models::{Migration, MigrationTarget, Workload};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Everything a transfer knows about the run it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct TransferJob<'a> {
    pub migration: &'a Migration,
    pub source: &'a Workload,
    pub target: &'a MigrationTarget,
}

#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Perform the transfer. The caller bounds this with a timeout.
    async fn transfer(&self, job: TransferJob<'_>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedTransfer {
    delay: Duration,
}

impl SimulatedTransfer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TransferExecutor for SimulatedTransfer {
    async fn transfer(&self, job: TransferJob<'_>) -> anyhow::Result<()> {
        debug!(
            migration_id = %job.migration.id,
            cloud_type = ?job.target.cloud_type,
            delay_ms = self.delay.as_millis() as u64,
            "simulating transfer"
        );
        tokio::time::sleep(self.delay).await;

        Ok(())
    }
}
