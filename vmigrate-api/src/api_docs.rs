use crate::routes::migrations::{RunResponse, StateResponse};
use utoipa::OpenApi;
use vmigrate_orchestrator::{
    CloudType, CreateCredentialsRequest, CreateMigrationRequest, CreateMigrationTargetRequest,
    CreateMountPointRequest, CreateWorkloadRequest, Credentials, Migration, MigrationState,
    MigrationTarget, MountPoint, RunReport, UpdateCredentialsRequest, UpdateMigrationRequest,
    UpdateMigrationTargetRequest, UpdateMountPointRequest, UpdateWorkloadRequest, Workload,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::migrations::list_migrations,
        crate::routes::migrations::create_migration,
        crate::routes::migrations::get_migration,
        crate::routes::migrations::update_migration,
        crate::routes::migrations::delete_migration,
        crate::routes::migrations::run_migration,
        crate::routes::migrations::migration_state,
        crate::routes::credentials::list_credentials,
        crate::routes::credentials::create_credentials,
        crate::routes::credentials::get_credentials,
        crate::routes::credentials::update_credentials,
        crate::routes::credentials::delete_credentials,
        crate::routes::mount_points::list_mount_points,
        crate::routes::mount_points::create_mount_point,
        crate::routes::mount_points::get_mount_point,
        crate::routes::mount_points::update_mount_point,
        crate::routes::mount_points::delete_mount_point,
        crate::routes::work_loads::list_workloads,
        crate::routes::work_loads::create_workload,
        crate::routes::work_loads::get_workload,
        crate::routes::work_loads::update_workload,
        crate::routes::work_loads::delete_workload,
        crate::routes::migration_targets::list_migration_targets,
        crate::routes::migration_targets::create_migration_target,
        crate::routes::migration_targets::get_migration_target,
        crate::routes::migration_targets::update_migration_target,
        crate::routes::migration_targets::delete_migration_target,
    ),
    components(
        schemas(
            Migration,
            MigrationState,
            CreateMigrationRequest,
            UpdateMigrationRequest,
            RunReport,
            RunResponse,
            StateResponse,
            Credentials,
            CreateCredentialsRequest,
            UpdateCredentialsRequest,
            MountPoint,
            CreateMountPointRequest,
            UpdateMountPointRequest,
            Workload,
            CreateWorkloadRequest,
            UpdateWorkloadRequest,
            MigrationTarget,
            CloudType,
            CreateMigrationTargetRequest,
            UpdateMigrationTargetRequest
        )
    ),
    tags(
        (name = "vmigrate-api", description = "Storage migration API")
    )
)]
pub struct ApiDoc;
