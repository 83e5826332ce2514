use crate::catalog::SqliteCatalog;
use crate::models::{
    CreateMigrationRequest, CreateMigrationTargetRequest, CreateMountPointRequest,
    CreateWorkloadRequest, Migration, MigrationTarget, MountPoint, Workload,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Helper to create an in-memory test database with migrations applied
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid in-memory database URL")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory database");

    // The path is relative to this crate's Cargo.toml.
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Fixture: a mount point with the given name and size
pub async fn fixture_mount_point(catalog: &SqliteCatalog, name: &str, total_size: i64) -> MountPoint {
    catalog
        .create_mount_point(CreateMountPointRequest {
            name: name.to_string(),
            total_size,
        })
        .await
        .expect("Failed to create fixture mount point")
}

/// Fixture: a workload at `address` holding `storage`
pub async fn fixture_workload(
    catalog: &SqliteCatalog,
    address: &str,
    storage: &[&MountPoint],
) -> Workload {
    catalog
        .register_workload(CreateWorkloadRequest {
            address: address.to_string(),
            credentials: None,
            storage: storage.iter().map(|mp| mp.id.clone()).collect(),
        })
        .await
        .expect("Failed to create fixture workload")
}

/// Fixture: an AWS target with nothing bound
pub async fn fixture_target(catalog: &SqliteCatalog) -> MigrationTarget {
    catalog
        .create_migration_target(CreateMigrationTargetRequest::default())
        .await
        .expect("Failed to create fixture migration target")
}

/// Fixture: a `not_started` migration of `selection` from `source` to `target`
pub async fn fixture_migration(
    catalog: &SqliteCatalog,
    source: &Workload,
    target: &MigrationTarget,
    selection: &[&MountPoint],
) -> Migration {
    catalog
        .create_migration(CreateMigrationRequest {
            selected_mount_points: selection.iter().map(|mp| mp.id.clone()).collect(),
            source: source.id.clone(),
            target: target.id.clone(),
        })
        .await
        .expect("Failed to create fixture migration")
}
