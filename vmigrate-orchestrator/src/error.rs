use crate::models::MigrationState;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("migration can't run: {id} is {state}")]
    IneligibleState { id: String, state: MigrationState },

    #[error(transparent)]
    RunFailed(#[from] RunFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        OrchestratorError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Why a started run ended in the `error` state.
///
/// Every variant is recorded on the migration as `last_error` and the
/// migration stays eligible for another run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    #[error("selected mount points not in source")]
    ReconciliationImpossible,

    #[error("provisioning failed: {0}")]
    ProvisioningFault(String),

    #[error("transfer failed: {0}")]
    TransferFault(String),

    #[error("transfer timed out after {0:?}")]
    TransferTimedOut(Duration),

    #[error("invalid migration: {0}")]
    InvalidMigration(String),

    #[error("run aborted: {0}")]
    Aborted(String),
}

impl RunFailure {
    /// Classify a catalog error raised while a run is in flight.
    pub(crate) fn from_catalog(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::NotFound { .. } => RunFailure::InvalidMigration(err.to_string()),
            other => RunFailure::ProvisioningFault(other.to_string()),
        }
    }
}
