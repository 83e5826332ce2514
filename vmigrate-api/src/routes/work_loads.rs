use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vmigrate_orchestrator::{Catalog, CreateWorkloadRequest, UpdateWorkloadRequest, Workload};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/work_loads",
            get(list_workloads).post(create_workload),
        )
        .route(
            "/api/v1/work_loads/{id}",
            get(get_workload)
                .patch(update_workload)
                .delete(delete_workload),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/work_loads",
    tag = "work_loads",
    responses((status = 200, body = Vec<Workload>))
)]
pub async fn list_workloads(State(state): State<AppState>) -> ApiResult<Json<Vec<Workload>>> {
    let workloads = state.catalog.list_workloads().await?;

    Ok(Json(workloads))
}

#[utoipa::path(
    post,
    path = "/api/v1/work_loads",
    tag = "work_loads",
    request_body = CreateWorkloadRequest,
    responses(
        (status = 200, body = Workload),
        (status = 400, description = "Validation failed, e.g. duplicate address")
    )
)]
pub async fn create_workload(
    State(state): State<AppState>,
    Json(req): Json<CreateWorkloadRequest>,
) -> ApiResult<Json<Workload>> {
    let workload = state.catalog.register_workload(req).await?;

    Ok(Json(workload))
}

#[utoipa::path(
    get,
    path = "/api/v1/work_loads/{id}",
    tag = "work_loads",
    params(("id" = String, Path, description = "Workload id")),
    responses(
        (status = 200, body = Workload),
        (status = 404, description = "Workload not found")
    )
)]
pub async fn get_workload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Workload>> {
    let workload = state.catalog.get_workload(&id).await?;

    Ok(Json(workload))
}

/// The address of a workload can't be changed once registered.
#[utoipa::path(
    patch,
    path = "/api/v1/work_loads/{id}",
    tag = "work_loads",
    params(("id" = String, Path, description = "Workload id")),
    request_body = UpdateWorkloadRequest,
    responses(
        (status = 200, body = Workload),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Workload not found")
    )
)]
pub async fn update_workload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateWorkloadRequest>,
) -> ApiResult<Json<Workload>> {
    let workload = state.catalog.update_workload(&id, req).await?;

    Ok(Json(workload))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work_loads/{id}",
    tag = "work_loads",
    params(("id" = String, Path, description = "Workload id")),
    responses(
        (status = 200, description = "Workload deleted"),
        (status = 404, description = "Workload not found")
    )
)]
pub async fn delete_workload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_workload(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Workload deleted" })))
}
