use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vmigrate_orchestrator::{
    Catalog, CreateMigrationTargetRequest, MigrationTarget, UpdateMigrationTargetRequest,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/migration_targets",
            get(list_migration_targets).post(create_migration_target),
        )
        .route(
            "/api/v1/migration_targets/{id}",
            get(get_migration_target)
                .patch(update_migration_target)
                .delete(delete_migration_target),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/migration_targets",
    tag = "migration_targets",
    responses((status = 200, body = Vec<MigrationTarget>))
)]
pub async fn list_migration_targets(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MigrationTarget>>> {
    let targets = state.catalog.list_migration_targets().await?;

    Ok(Json(targets))
}

#[utoipa::path(
    post,
    path = "/api/v1/migration_targets",
    tag = "migration_targets",
    request_body = CreateMigrationTargetRequest,
    responses(
        (status = 200, body = MigrationTarget),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_migration_target(
    State(state): State<AppState>,
    Json(req): Json<CreateMigrationTargetRequest>,
) -> ApiResult<Json<MigrationTarget>> {
    let target = state.catalog.create_migration_target(req).await?;

    Ok(Json(target))
}

#[utoipa::path(
    get,
    path = "/api/v1/migration_targets/{id}",
    tag = "migration_targets",
    params(("id" = String, Path, description = "Migration target id")),
    responses(
        (status = 200, body = MigrationTarget),
        (status = 404, description = "Migration target not found")
    )
)]
pub async fn get_migration_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MigrationTarget>> {
    let target = state.catalog.get_migration_target(&id).await?;

    Ok(Json(target))
}

#[utoipa::path(
    patch,
    path = "/api/v1/migration_targets/{id}",
    tag = "migration_targets",
    params(("id" = String, Path, description = "Migration target id")),
    request_body = UpdateMigrationTargetRequest,
    responses(
        (status = 200, body = MigrationTarget),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Migration target not found")
    )
)]
pub async fn update_migration_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMigrationTargetRequest>,
) -> ApiResult<Json<MigrationTarget>> {
    let target = state.catalog.update_migration_target(&id, req).await?;

    Ok(Json(target))
}

#[utoipa::path(
    delete,
    path = "/api/v1/migration_targets/{id}",
    tag = "migration_targets",
    params(("id" = String, Path, description = "Migration target id")),
    responses(
        (status = 200, description = "Migration target deleted"),
        (status = 404, description = "Migration target not found")
    )
)]
pub async fn delete_migration_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_migration_target(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Migration target deleted" })))
}
