use super::{Catalog, Claim};
use crate::error::{OrchestratorError, Result};
use crate::models::{
    CloudType, Migration, MigrationState, MigrationTarget, MountPoint, NewWorkload, Workload,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

/// SQLite-backed catalog.
#[derive(Clone)]
pub struct SqliteCatalog {
    pub(super) pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn get_workload(&self, id: &str) -> Result<Workload> {
        let mut conn = self.pool.acquire().await?;
        load_workload(&mut conn, id).await
    }

    async fn get_mount_point(&self, id: &str) -> Result<MountPoint> {
        let row = sqlx::query_as::<_, MountPointRow>(
            "SELECT id, name, total_size FROM mount_points WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::not_found("Mount point", id))?;

        Ok(row.into())
    }

    async fn get_migration_target(&self, id: &str) -> Result<MigrationTarget> {
        let row = sqlx::query_as::<_, MigrationTargetRow>(
            "SELECT id, cloud_type, cloud_credentials_id, target_vm_id FROM migration_targets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::not_found("Migration target", id))?;

        Ok(row.into())
    }

    async fn get_migration(&self, id: &str) -> Result<Migration> {
        let mut conn = self.pool.acquire().await?;
        load_migration(&mut conn, id).await
    }

    async fn create_workload(&self, workload: NewWorkload) -> Result<Workload> {
        let mut tx = self.pool.begin().await?;
        let created = insert_workload(&mut tx, &workload).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn set_target_vm(&self, target_id: &str, workload_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE migration_targets SET target_vm_id = ? WHERE id = ?")
            .bind(workload_id)
            .bind(target_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Migration target", target_id));
        }

        Ok(())
    }

    async fn bind_new_workload(&self, target_id: &str, workload: NewWorkload) -> Result<Workload> {
        let mut tx = self.pool.begin().await?;

        let created = insert_workload(&mut tx, &workload).await?;

        let result = sqlx::query("UPDATE migration_targets SET target_vm_id = ? WHERE id = ?")
            .bind(&created.id)
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the workload insert.
            return Err(OrchestratorError::not_found("Migration target", target_id));
        }

        tx.commit().await?;
        debug!(target_id, workload_id = %created.id, "bound derived workload");

        Ok(created)
    }

    async fn set_migration_state(
        &self,
        id: &str,
        state: MigrationState,
        last_error: Option<String>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE migrations SET migration_state = ?, last_error = ?, updated_at = ? WHERE id = ?",
        )
        .bind(state)
        .bind(last_error)
        .bind(Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Migration", id));
        }

        Ok(())
    }

    async fn claim_for_run(&self, id: &str) -> Result<Claim> {
        // The claim only commits once the claimed record has been read back.
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE migrations
             SET migration_state = ?, last_error = NULL, updated_at = ?
             WHERE id = ? AND migration_state IN (?, ?)",
        )
        .bind(MigrationState::Running)
        .bind(Utc::now().timestamp())
        .bind(id)
        .bind(MigrationState::NotStarted)
        .bind(MigrationState::Error)
        .execute(&mut *tx)
        .await?;

        let migration = load_migration(&mut tx, id).await?;
        tx.commit().await?;

        if result.rows_affected() == 1 {
            Ok(Claim::Claimed(migration))
        } else {
            Ok(Claim::Ineligible(migration.migration_state))
        }
    }

    async fn list_migrations_in_state(&self, state: MigrationState) -> Result<Vec<Migration>> {
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM migrations WHERE migration_state = ? ORDER BY rowid",
        )
        .bind(state)
        .fetch_all(&mut *conn)
        .await?;

        let mut migrations = Vec::with_capacity(ids.len());
        for id in ids {
            migrations.push(load_migration(&mut conn, &id).await?);
        }

        Ok(migrations)
    }
}

pub(super) async fn load_workload(conn: &mut SqliteConnection, id: &str) -> Result<Workload> {
    let row = sqlx::query_as::<_, WorkloadRow>(
        "SELECT id, address, credentials_id FROM workloads WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| OrchestratorError::not_found("Workload", id))?;

    let storage = load_storage(conn, id).await?;

    Ok(Workload {
        id: row.id,
        address: row.address,
        credentials: row.credentials_id,
        storage,
    })
}

async fn load_storage(conn: &mut SqliteConnection, workload_id: &str) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar(
        "SELECT mount_point_id FROM workload_storage WHERE workload_id = ? ORDER BY mount_point_id",
    )
    .bind(workload_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

pub(super) async fn insert_workload(
    conn: &mut SqliteConnection,
    workload: &NewWorkload,
) -> Result<Workload> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO workloads (id, address, credentials_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&workload.address)
        .bind(&workload.credentials)
        .bind(Utc::now().timestamp())
        .execute(&mut *conn)
        .await?;

    replace_storage(conn, &id, &workload.storage).await?;

    load_workload(conn, &id).await
}

pub(super) async fn replace_storage(
    conn: &mut SqliteConnection,
    workload_id: &str,
    storage: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM workload_storage WHERE workload_id = ?")
        .bind(workload_id)
        .execute(&mut *conn)
        .await?;

    for mount_point_id in storage {
        sqlx::query(
            "INSERT OR IGNORE INTO workload_storage (workload_id, mount_point_id) VALUES (?, ?)",
        )
        .bind(workload_id)
        .bind(mount_point_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub(super) async fn load_migration(conn: &mut SqliteConnection, id: &str) -> Result<Migration> {
    let row = sqlx::query_as::<_, MigrationRow>(
        "SELECT id, source_id, target_id, migration_state, last_error, created_at, updated_at
         FROM migrations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| OrchestratorError::not_found("Migration", id))?;

    let selected_mount_points = sqlx::query_scalar(
        "SELECT mount_point_id FROM migration_selection WHERE migration_id = ? ORDER BY mount_point_id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Migration {
        id: row.id,
        selected_mount_points,
        source: row.source_id,
        target: row.target_id,
        migration_state: row.migration_state,
        last_error: row.last_error,
        created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
        updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
    })
}

pub(super) async fn replace_selection(
    conn: &mut SqliteConnection,
    migration_id: &str,
    selection: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM migration_selection WHERE migration_id = ?")
        .bind(migration_id)
        .execute(&mut *conn)
        .await?;

    for mount_point_id in selection {
        sqlx::query(
            "INSERT OR IGNORE INTO migration_selection (migration_id, mount_point_id) VALUES (?, ?)",
        )
        .bind(migration_id)
        .bind(mount_point_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// Internal row types for sqlx
#[derive(sqlx::FromRow)]
pub(super) struct CredentialsRow {
    pub(super) id: String,
    pub(super) username: String,
    pub(super) password: String,
    pub(super) domain: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct MountPointRow {
    id: String,
    name: String,
    total_size: i64,
}

#[derive(sqlx::FromRow)]
struct WorkloadRow {
    id: String,
    address: String,
    credentials_id: Option<String>,
}

#[derive(sqlx::FromRow)]
pub(super) struct MigrationTargetRow {
    id: String,
    cloud_type: CloudType,
    cloud_credentials_id: Option<String>,
    target_vm_id: Option<String>,
}

#[derive(sqlx::FromRow)]
struct MigrationRow {
    id: String,
    source_id: Option<String>,
    target_id: Option<String>,
    migration_state: MigrationState,
    last_error: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<CredentialsRow> for crate::models::Credentials {
    fn from(row: CredentialsRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: row.password,
            domain: row.domain,
        }
    }
}

impl From<MountPointRow> for MountPoint {
    fn from(row: MountPointRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            total_size: row.total_size,
        }
    }
}

impl From<MigrationTargetRow> for MigrationTarget {
    fn from(row: MigrationTargetRow) -> Self {
        Self {
            id: row.id,
            cloud_type: row.cloud_type,
            cloud_credentials: row.cloud_credentials_id,
            target_vm: row.target_vm_id,
        }
    }
}
