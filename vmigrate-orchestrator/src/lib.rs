//! Migration execution engine
//!
//! This crate contains the catalog of workloads, mount points and migration
//! targets, and the engine that runs a migration: reconciliation of the
//! requested storage, provisioning of the destination workload, and the
//! lifecycle state machine. It is consumed by the vmigrate-api HTTP service
//! but can also be driven by CLI commands or background workers.

pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod provision;
pub mod reconcile;
pub mod runner;
pub mod test_utils;
pub mod transfer;

pub use catalog::{Catalog, Claim, SqliteCatalog};
pub use error::{OrchestratorError, Result, RunFailure};
pub use models::{
    CloudType, CreateCredentialsRequest, CreateMigrationRequest, CreateMigrationTargetRequest,
    CreateMountPointRequest, CreateWorkloadRequest, Credentials, Migration, MigrationState,
    MigrationTarget, MountPoint, NewWorkload, UpdateCredentialsRequest, UpdateMigrationRequest,
    UpdateMigrationTargetRequest, UpdateMountPointRequest, UpdateWorkloadRequest, Workload,
};
pub use orchestrator::{MigrationOrchestrator, RunReport};
pub use reconcile::{reconcile, Reconciliation};
pub use runner::{MigrationRunner, RunOutcome};
pub use transfer::{SimulatedTransfer, TransferExecutor, TransferJob};
