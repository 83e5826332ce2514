//! Administrative CRUD for catalog records.
//!
//! These operations back the REST resources and enforce the catalog's input
//! rules. The migration engine itself only goes through the [`Catalog`] trait.

use super::sqlite::{
    insert_workload, load_migration, load_workload, replace_selection, replace_storage,
    CredentialsRow, MigrationTargetRow, MountPointRow,
};
use super::{Catalog, SqliteCatalog};
use crate::error::{OrchestratorError, Result};
use crate::models::{
    CreateCredentialsRequest, CreateMigrationRequest, CreateMigrationTargetRequest,
    CreateMountPointRequest, CreateWorkloadRequest, Credentials, Migration, MigrationState,
    MigrationTarget, MountPoint, NewWorkload, UpdateCredentialsRequest, UpdateMigrationRequest,
    UpdateMigrationTargetRequest, UpdateMountPointRequest, UpdateWorkloadRequest, Workload,
};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

const MAX_ADDRESS_LEN: usize = 50;
const MAX_USERNAME_LEN: usize = 50;
const MAX_PASSWORD_LEN: usize = 50;
const MAX_DOMAIN_LEN: usize = 100;
const MAX_MOUNT_POINT_NAME_LEN: usize = 100;

impl SqliteCatalog {
    // --- Credentials ---

    pub async fn create_credentials(&self, req: CreateCredentialsRequest) -> Result<Credentials> {
        let credentials = Credentials {
            id: Uuid::new_v4().to_string(),
            username: require_text("username", req.username, MAX_USERNAME_LEN)?,
            password: require_text("password", req.password, MAX_PASSWORD_LEN)?,
            domain: require_text("domain", req.domain, MAX_DOMAIN_LEN)?,
        };

        sqlx::query("INSERT INTO credentials (id, username, password, domain) VALUES (?, ?, ?, ?)")
            .bind(&credentials.id)
            .bind(&credentials.username)
            .bind(&credentials.password)
            .bind(&credentials.domain)
            .execute(&self.pool)
            .await?;

        Ok(credentials)
    }

    pub async fn list_credentials(&self) -> Result<Vec<Credentials>> {
        let rows = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, username, password, domain FROM credentials ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn get_credentials(&self, id: &str) -> Result<Credentials> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, username, password, domain FROM credentials WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrchestratorError::not_found("Credentials", id))?;

        Ok(row.into())
    }

    pub async fn update_credentials(
        &self,
        id: &str,
        req: UpdateCredentialsRequest,
    ) -> Result<Credentials> {
        let mut credentials = self.get_credentials(id).await?;

        if let Some(username) = req.username {
            credentials.username = require_text("username", username, MAX_USERNAME_LEN)?;
        }
        if let Some(password) = req.password {
            credentials.password = require_text("password", password, MAX_PASSWORD_LEN)?;
        }
        if let Some(domain) = req.domain {
            credentials.domain = require_text("domain", domain, MAX_DOMAIN_LEN)?;
        }

        sqlx::query("UPDATE credentials SET username = ?, password = ?, domain = ? WHERE id = ?")
            .bind(&credentials.username)
            .bind(&credentials.password)
            .bind(&credentials.domain)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(credentials)
    }

    /// Delete credentials; workloads and targets referencing them keep existing
    /// with the reference cleared.
    pub async fn delete_credentials(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Credentials", id));
        }

        Ok(())
    }

    // --- Mount points ---

    pub async fn create_mount_point(&self, req: CreateMountPointRequest) -> Result<MountPoint> {
        let mount_point = MountPoint {
            id: Uuid::new_v4().to_string(),
            name: require_text("name", req.name, MAX_MOUNT_POINT_NAME_LEN)?,
            total_size: require_size(req.total_size)?,
        };

        sqlx::query("INSERT INTO mount_points (id, name, total_size) VALUES (?, ?, ?)")
            .bind(&mount_point.id)
            .bind(&mount_point.name)
            .bind(mount_point.total_size)
            .execute(&self.pool)
            .await?;

        Ok(mount_point)
    }

    pub async fn list_mount_points(&self) -> Result<Vec<MountPoint>> {
        let rows = sqlx::query_as::<_, MountPointRow>(
            "SELECT id, name, total_size FROM mount_points ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    /// Update a mount point that no migration has selected yet.
    pub async fn update_mount_point(
        &self,
        id: &str,
        req: UpdateMountPointRequest,
    ) -> Result<MountPoint> {
        let mut mount_point = self.get_mount_point(id).await?;
        self.ensure_not_selected(id).await?;

        if let Some(name) = req.name {
            mount_point.name = require_text("name", name, MAX_MOUNT_POINT_NAME_LEN)?;
        }
        if let Some(total_size) = req.total_size {
            mount_point.total_size = require_size(total_size)?;
        }

        sqlx::query("UPDATE mount_points SET name = ?, total_size = ? WHERE id = ?")
            .bind(&mount_point.name)
            .bind(mount_point.total_size)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(mount_point)
    }

    pub async fn delete_mount_point(&self, id: &str) -> Result<()> {
        self.get_mount_point(id).await?;
        self.ensure_not_selected(id).await?;

        sqlx::query("DELETE FROM mount_points WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ensure_not_selected(&self, mount_point_id: &str) -> Result<()> {
        let selected: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM migration_selection WHERE mount_point_id = ?")
                .bind(mount_point_id)
                .fetch_one(&self.pool)
                .await?;

        if selected > 0 {
            return Err(OrchestratorError::InvalidInput(format!(
                "mount point {} is selected by a migration and can't be changed",
                mount_point_id
            )));
        }

        Ok(())
    }

    // --- Workloads ---

    /// Register a caller-supplied workload. Addresses are unique among
    /// registered workloads; derived workloads created by provisioning bypass
    /// this check.
    pub async fn register_workload(&self, req: CreateWorkloadRequest) -> Result<Workload> {
        let address = require_text("address", req.address, MAX_ADDRESS_LEN)?;
        let storage = require_ids("storage", req.storage)?;

        let mut tx = self.pool.begin().await?;

        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workloads WHERE address = ?")
            .bind(&address)
            .fetch_one(&mut *tx)
            .await?;
        if taken > 0 {
            return Err(OrchestratorError::InvalidInput(
                "address: This field is unique.".to_string(),
            ));
        }

        if let Some(credentials_id) = &req.credentials {
            ensure_exists(&mut tx, "credentials", "credentials", credentials_id).await?;
        }
        for mount_point_id in &storage {
            ensure_exists(&mut tx, "mount_points", "storage", mount_point_id).await?;
        }

        let workload = insert_workload(
            &mut tx,
            &NewWorkload {
                address,
                credentials: req.credentials,
                storage,
            },
        )
        .await?;

        tx.commit().await?;
        info!(workload_id = %workload.id, address = %workload.address, "registered workload");

        Ok(workload)
    }

    pub async fn list_workloads(&self) -> Result<Vec<Workload>> {
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM workloads ORDER BY rowid")
            .fetch_all(&mut *conn)
            .await?;

        let mut workloads = Vec::with_capacity(ids.len());
        for id in ids {
            workloads.push(load_workload(&mut conn, &id).await?);
        }

        Ok(workloads)
    }

    pub async fn update_workload(&self, id: &str, req: UpdateWorkloadRequest) -> Result<Workload> {
        if req.address.is_some() {
            return Err(OrchestratorError::InvalidInput(format!(
                "address of workload {} can't be changed",
                id
            )));
        }

        let mut tx = self.pool.begin().await?;
        load_workload(&mut tx, id).await?;

        if let Some(credentials_id) = &req.credentials {
            ensure_exists(&mut tx, "credentials", "credentials", credentials_id).await?;
            sqlx::query("UPDATE workloads SET credentials_id = ? WHERE id = ?")
                .bind(credentials_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(storage) = req.storage {
            let storage = require_ids("storage", storage)?;
            for mount_point_id in &storage {
                ensure_exists(&mut tx, "mount_points", "storage", mount_point_id).await?;
            }
            replace_storage(&mut tx, id, &storage).await?;
        }

        let workload = load_workload(&mut tx, id).await?;
        tx.commit().await?;

        Ok(workload)
    }

    pub async fn delete_workload(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM workloads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Workload", id));
        }

        Ok(())
    }

    // --- Migration targets ---

    pub async fn create_migration_target(
        &self,
        req: CreateMigrationTargetRequest,
    ) -> Result<MigrationTarget> {
        let mut conn = self.pool.acquire().await?;

        if let Some(credentials_id) = &req.cloud_credentials {
            ensure_exists(&mut conn, "credentials", "cloud credentials", credentials_id).await?;
        }
        if let Some(workload_id) = &req.target_vm {
            ensure_exists(&mut conn, "workloads", "workload", workload_id).await?;
        }

        let target = MigrationTarget {
            id: Uuid::new_v4().to_string(),
            cloud_type: req.cloud_type.unwrap_or_default(),
            cloud_credentials: req.cloud_credentials,
            target_vm: req.target_vm,
        };

        sqlx::query(
            "INSERT INTO migration_targets (id, cloud_type, cloud_credentials_id, target_vm_id)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&target.id)
        .bind(target.cloud_type)
        .bind(&target.cloud_credentials)
        .bind(&target.target_vm)
        .execute(&mut *conn)
        .await?;

        Ok(target)
    }

    pub async fn list_migration_targets(&self) -> Result<Vec<MigrationTarget>> {
        let rows = sqlx::query_as::<_, MigrationTargetRow>(
            "SELECT id, cloud_type, cloud_credentials_id, target_vm_id FROM migration_targets ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    pub async fn update_migration_target(
        &self,
        id: &str,
        req: UpdateMigrationTargetRequest,
    ) -> Result<MigrationTarget> {
        let mut target = self.get_migration_target(id).await?;
        let mut conn = self.pool.acquire().await?;

        if let Some(cloud_type) = req.cloud_type {
            target.cloud_type = cloud_type;
        }
        if let Some(credentials_id) = req.cloud_credentials {
            ensure_exists(&mut conn, "credentials", "cloud credentials", &credentials_id).await?;
            target.cloud_credentials = Some(credentials_id);
        }
        if let Some(workload_id) = req.target_vm {
            ensure_exists(&mut conn, "workloads", "workload", &workload_id).await?;
            target.target_vm = Some(workload_id);
        }

        sqlx::query(
            "UPDATE migration_targets SET cloud_type = ?, cloud_credentials_id = ?, target_vm_id = ?
             WHERE id = ?",
        )
        .bind(target.cloud_type)
        .bind(&target.cloud_credentials)
        .bind(&target.target_vm)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(target)
    }

    pub async fn delete_migration_target(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM migration_targets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::not_found("Migration target", id));
        }

        Ok(())
    }

    // --- Migrations ---

    pub async fn create_migration(&self, req: CreateMigrationRequest) -> Result<Migration> {
        let selection = require_ids("selected_mount_points", req.selected_mount_points)?;

        let mut tx = self.pool.begin().await?;

        for mount_point_id in &selection {
            ensure_exists(&mut tx, "mount_points", "storage", mount_point_id).await?;
        }
        ensure_exists(&mut tx, "workloads", "workload", &req.source).await?;
        ensure_exists(&mut tx, "migration_targets", "migration target", &req.target).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO migrations (id, source_id, target_id, migration_state, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&req.source)
        .bind(&req.target)
        .bind(MigrationState::NotStarted)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        replace_selection(&mut tx, &id, &selection).await?;

        let migration = load_migration(&mut tx, &id).await?;
        tx.commit().await?;
        info!(migration_id = %migration.id, "created migration");

        Ok(migration)
    }

    pub async fn list_migrations(&self) -> Result<Vec<Migration>> {
        let mut conn = self.pool.acquire().await?;

        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM migrations ORDER BY rowid")
            .fetch_all(&mut *conn)
            .await?;

        let mut migrations = Vec::with_capacity(ids.len());
        for id in ids {
            migrations.push(load_migration(&mut conn, &id).await?);
        }

        Ok(migrations)
    }

    /// Edit the request side of a migration. The lifecycle state is owned by
    /// the orchestrator and can't be changed here.
    pub async fn update_migration(&self, id: &str, req: UpdateMigrationRequest) -> Result<Migration> {
        let mut tx = self.pool.begin().await?;

        let current = load_migration(&mut tx, id).await?;
        if current.migration_state == MigrationState::Running {
            return Err(OrchestratorError::InvalidInput(format!(
                "migration {} is running and can't be changed",
                id
            )));
        }

        let selection = match req.selected_mount_points {
            Some(selection) => {
                let selection = require_ids("selected_mount_points", selection)?;
                for mount_point_id in &selection {
                    ensure_exists(&mut tx, "mount_points", "storage", mount_point_id).await?;
                }
                Some(selection)
            }
            None => None,
        };
        if let Some(source) = &req.source {
            ensure_exists(&mut tx, "workloads", "workload", source).await?;
        }
        if let Some(target) = &req.target {
            ensure_exists(&mut tx, "migration_targets", "migration target", target).await?;
        }

        // A run may have claimed the record since it was read above.
        let result = sqlx::query(
            "UPDATE migrations SET source_id = ?, target_id = ?, updated_at = ?
             WHERE id = ? AND migration_state != ?",
        )
        .bind(req.source.or(current.source))
        .bind(req.target.or(current.target))
        .bind(Utc::now().timestamp())
        .bind(id)
        .bind(MigrationState::Running)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OrchestratorError::InvalidInput(format!(
                "migration {} is running and can't be changed",
                id
            )));
        }

        if let Some(selection) = selection {
            replace_selection(&mut tx, id, &selection).await?;
        }

        let migration = load_migration(&mut tx, id).await?;
        tx.commit().await?;

        Ok(migration)
    }

    pub async fn delete_migration(&self, id: &str) -> Result<()> {
        let migration = self.get_migration(id).await?;
        if migration.migration_state == MigrationState::Running {
            return Err(OrchestratorError::InvalidInput(format!(
                "migration {} is running and can't be deleted",
                id
            )));
        }

        sqlx::query("DELETE FROM migrations WHERE id = ? AND migration_state != ?")
            .bind(id)
            .bind(MigrationState::Running)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

async fn ensure_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    name: &str,
    id: &str,
) -> Result<()> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    if found.is_none() {
        return Err(OrchestratorError::InvalidInput(format!(
            "{} {} does not exist",
            id, name
        )));
    }

    Ok(())
}

fn require_text(field: &str, value: String, max_len: usize) -> Result<String> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::InvalidInput(format!(
            "{}: This field is required.",
            field
        )));
    }
    if value.chars().count() > max_len {
        return Err(OrchestratorError::InvalidInput(format!(
            "{}: Ensure this field has no more than {} characters.",
            field, max_len
        )));
    }

    Ok(value)
}

fn require_size(total_size: i64) -> Result<i64> {
    if total_size < 0 {
        return Err(OrchestratorError::InvalidInput(
            "total_size: Ensure this value is greater than or equal to 0.".to_string(),
        ));
    }

    Ok(total_size)
}

/// Sort and dedupe a list of record ids, rejecting an empty list.
fn require_ids(field: &str, mut ids: Vec<String>) -> Result<Vec<String>> {
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Err(OrchestratorError::InvalidInput(format!(
            "{}: This field is required.",
            field
        )));
    }

    Ok(ids)
}
