pub mod credentials;
pub mod health;
pub mod migration_targets;
pub mod migrations;
pub mod mount_points;
pub mod work_loads;

use crate::{api_docs::ApiDoc, auth::auth_middleware, state::AppState};
use axum::{middleware, routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub async fn create_app(state: AppState) -> anyhow::Result<Router> {
    // Allow CORS for local development (frontend on different port)
    let cors = CorsLayer::permissive();

    let app = Router::new()
        .merge(health::routes()) // Health routes don't need auth
        .route("/api-docs/openapi.json", get(openapi_spec))
        .merge(
            migrations::routes()
                .merge(credentials::routes())
                .merge(mount_points::routes())
                .merge(work_loads::routes())
                .merge(migration_targets::routes())
                .layer(middleware::from_fn(auth_middleware)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
