use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vmigrate_orchestrator::{CreateCredentialsRequest, Credentials, UpdateCredentialsRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/credentials",
            get(list_credentials).post(create_credentials),
        )
        .route(
            "/api/v1/credentials/{id}",
            get(get_credentials)
                .patch(update_credentials)
                .delete(delete_credentials),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/credentials",
    tag = "credentials",
    responses((status = 200, body = Vec<Credentials>))
)]
pub async fn list_credentials(State(state): State<AppState>) -> ApiResult<Json<Vec<Credentials>>> {
    let credentials = state.catalog.list_credentials().await?;

    Ok(Json(credentials))
}

#[utoipa::path(
    post,
    path = "/api/v1/credentials",
    tag = "credentials",
    request_body = CreateCredentialsRequest,
    responses(
        (status = 200, body = Credentials),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_credentials(
    State(state): State<AppState>,
    Json(req): Json<CreateCredentialsRequest>,
) -> ApiResult<Json<Credentials>> {
    let credentials = state.catalog.create_credentials(req).await?;

    Ok(Json(credentials))
}

#[utoipa::path(
    get,
    path = "/api/v1/credentials/{id}",
    tag = "credentials",
    params(("id" = String, Path, description = "Credentials id")),
    responses(
        (status = 200, body = Credentials),
        (status = 404, description = "Credentials not found")
    )
)]
pub async fn get_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Credentials>> {
    let credentials = state.catalog.get_credentials(&id).await?;

    Ok(Json(credentials))
}

#[utoipa::path(
    patch,
    path = "/api/v1/credentials/{id}",
    tag = "credentials",
    params(("id" = String, Path, description = "Credentials id")),
    request_body = UpdateCredentialsRequest,
    responses(
        (status = 200, body = Credentials),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Credentials not found")
    )
)]
pub async fn update_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCredentialsRequest>,
) -> ApiResult<Json<Credentials>> {
    let credentials = state.catalog.update_credentials(&id, req).await?;

    Ok(Json(credentials))
}

#[utoipa::path(
    delete,
    path = "/api/v1/credentials/{id}",
    tag = "credentials",
    params(("id" = String, Path, description = "Credentials id")),
    responses(
        (status = 200, description = "Credentials deleted"),
        (status = 404, description = "Credentials not found")
    )
)]
pub async fn delete_credentials(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_credentials(&id).await?;

    Ok(Json(serde_json::json!({ "message": "Credentials deleted" })))
}
