use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vmigrate_orchestrator::{Catalog, CreateMountPointRequest, MountPoint, UpdateMountPointRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/mount_points",
            get(list_mount_points).post(create_mount_point),
        )
        .route(
            "/api/v1/mount_points/{id}",
            get(get_mount_point)
                .patch(update_mount_point)
                .delete(delete_mount_point),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/mount_points",
    tag = "mount_points",
    responses((status = 200, body = Vec<MountPoint>))
)]
pub async fn list_mount_points(State(state): State<AppState>) -> ApiResult<Json<Vec<MountPoint>>> {
    let mount_points = state.catalog.list_mount_points().await?;

    Ok(Json(mount_points))
}

#[utoipa::path(
    post,
    path = "/api/v1/mount_points",
    tag = "mount_points",
    request_body = CreateMountPointRequest,
    responses(
        (status = 200, body = MountPoint),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_mount_point(
    State(state): State<AppState>,
    Json(req): Json<CreateMountPointRequest>,
) -> ApiResult<Json<MountPoint>> {
    let mount_point = state.catalog.create_mount_point(req).await?;

    Ok(Json(mount_point))
}

#[utoipa::path(
    get,
    path = "/api/v1/mount_points/{id}",
    tag = "mount_points",
    params(("id" = String, Path, description = "Mount point id")),
    responses(
        (status = 200, body = MountPoint),
        (status = 404, description = "Mount point not found")
    )
)]
pub async fn get_mount_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MountPoint>> {
    let mount_point = state.catalog.get_mount_point(&id).await?;

    Ok(Json(mount_point))
}

/// Mount points selected by a migration are frozen and reject updates.
#[utoipa::path(
    patch,
    path = "/api/v1/mount_points/{id}",
    tag = "mount_points",
    params(("id" = String, Path, description = "Mount point id")),
    request_body = UpdateMountPointRequest,
    responses(
        (status = 200, body = MountPoint),
        (status = 400, description = "Validation failed or mount point is selected"),
        (status = 404, description = "Mount point not found")
    )
)]
pub async fn update_mount_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMountPointRequest>,
) -> ApiResult<Json<MountPoint>> {
    let mount_point = state.catalog.update_mount_point(&id, req).await?;

    Ok(Json(mount_point))
}

#[utoipa::path(
    delete,
    path = "/api/v1/mount_points/{id}",
    tag = "mount_points",
    params(("id" = String, Path, description = "Mount point id")),
    responses(
        (status = 200, description = "Mount point deleted"),
        (status = 400, description = "Mount point is selected by a migration"),
        (status = 404, description = "Mount point not found")
    )
)]
pub async fn delete_mount_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_mount_point(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Mount point deleted" })))
}
