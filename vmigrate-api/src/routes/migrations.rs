use crate::{auth::AuthenticatedUser, error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use vmigrate_orchestrator::{
    Catalog, CreateMigrationRequest, Migration, MigrationState, RunReport, UpdateMigrationRequest,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RunResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: RunReport,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StateResponse {
    pub migration_state: MigrationState,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/migrations",
            get(list_migrations).post(create_migration),
        )
        .route(
            "/api/v1/migrations/{id}",
            get(get_migration)
                .patch(update_migration)
                .delete(delete_migration),
        )
        .route("/api/v1/migrations/{id}/run", post(run_migration))
        .route("/api/v1/migrations/{id}/state", get(migration_state))
}

#[utoipa::path(
    get,
    path = "/api/v1/migrations",
    tag = "migrations",
    responses((status = 200, body = Vec<Migration>))
)]
pub async fn list_migrations(State(state): State<AppState>) -> ApiResult<Json<Vec<Migration>>> {
    let migrations = state.catalog.list_migrations().await?;

    Ok(Json(migrations))
}

#[utoipa::path(
    post,
    path = "/api/v1/migrations",
    tag = "migrations",
    request_body = CreateMigrationRequest,
    responses(
        (status = 200, body = Migration),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_migration(
    State(state): State<AppState>,
    Json(req): Json<CreateMigrationRequest>,
) -> ApiResult<Json<Migration>> {
    let migration = state.catalog.create_migration(req).await?;

    Ok(Json(migration))
}

#[utoipa::path(
    get,
    path = "/api/v1/migrations/{id}",
    tag = "migrations",
    params(("id" = String, Path, description = "Migration id")),
    responses(
        (status = 200, body = Migration),
        (status = 404, description = "Migration not found")
    )
)]
pub async fn get_migration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Migration>> {
    let migration = state.catalog.get_migration(&id).await?;

    Ok(Json(migration))
}

#[utoipa::path(
    patch,
    path = "/api/v1/migrations/{id}",
    tag = "migrations",
    params(("id" = String, Path, description = "Migration id")),
    request_body = UpdateMigrationRequest,
    responses(
        (status = 200, body = Migration),
        (status = 400, description = "Validation failed or migration is running"),
        (status = 404, description = "Migration not found")
    )
)]
pub async fn update_migration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMigrationRequest>,
) -> ApiResult<Json<Migration>> {
    let migration = state.catalog.update_migration(&id, req).await?;

    Ok(Json(migration))
}

#[utoipa::path(
    delete,
    path = "/api/v1/migrations/{id}",
    tag = "migrations",
    params(("id" = String, Path, description = "Migration id")),
    responses(
        (status = 200, description = "Migration deleted"),
        (status = 400, description = "Migration is running"),
        (status = 404, description = "Migration not found")
    )
)]
pub async fn delete_migration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_migration(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Migration deleted" })))
}

/// Run a migration and wait for it to finish.
#[utoipa::path(
    post,
    path = "/api/v1/migrations/{id}/run",
    tag = "migrations",
    params(("id" = String, Path, description = "Migration id")),
    responses(
        (status = 200, body = RunResponse),
        (status = 400, description = "Migration can't run, or the run failed"),
        (status = 404, description = "Migration not found")
    )
)]
pub async fn run_migration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<RunResponse>> {
    info!("Migration {} run requested by {}", id, user.username);

    let report = state.orchestrator.execute(&id).await?;

    Ok(Json(RunResponse {
        message: "migration successfully completed".to_string(),
        report,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/migrations/{id}/state",
    tag = "migrations",
    params(("id" = String, Path, description = "Migration id")),
    responses(
        (status = 200, body = StateResponse),
        (status = 404, description = "Migration not found")
    )
)]
pub async fn migration_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StateResponse>> {
    let migration_state = state.orchestrator.get_state(&id).await?;

    Ok(Json(StateResponse { migration_state }))
}
