//! Integration tests for the startup recovery sweep
//!
//! Migrations persisted as `running` by a process that died must be moved to
//! `error` so they can be run again.

mod common;

use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use vmigrate_api::{recover_interrupted_runs, AppState};
use vmigrate_orchestrator::{Catalog, MigrationState, SimulatedTransfer, SqliteCatalog};

fn test_state(pool: sqlx::SqlitePool) -> AppState {
    AppState::with_executor(
        pool,
        Arc::new(SimulatedTransfer::default()),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn test_recovery_fails_stranded_runs() {
    let pool = common::create_test_db().await;
    let scenario = common::fixture_scenario(&pool).await;
    let stranded = common::fixture_migration(&pool, &scenario, &[&scenario.a]).await;
    let untouched = common::fixture_migration(&pool, &scenario, &[&scenario.b]).await;

    let catalog = SqliteCatalog::new(pool.clone());
    catalog
        .set_migration_state(&stranded.id, MigrationState::Running, None)
        .await
        .unwrap();

    let state = test_state(pool);
    let recovered = recover_interrupted_runs(&state.orchestrator)
        .await
        .expect("Recovery failed");

    assert_eq!(recovered, 1);

    let stranded = catalog.get_migration(&stranded.id).await.unwrap();
    assert_eq!(stranded.migration_state, MigrationState::Error);
    assert_eq!(stranded.last_error.as_deref(), Some("run aborted: interrupted"));

    let untouched = catalog.get_migration(&untouched.id).await.unwrap();
    assert_eq!(untouched.migration_state, MigrationState::NotStarted);
}

#[tokio::test]
async fn test_recovery_with_nothing_to_do() {
    let pool = common::create_test_db().await;
    let scenario = common::fixture_scenario(&pool).await;
    common::fixture_migration(&pool, &scenario, &[&scenario.a]).await;

    let state = test_state(pool);

    assert_eq!(recover_interrupted_runs(&state.orchestrator).await.unwrap(), 0);
}

#[tokio::test]
async fn test_recovered_migration_can_run_again() {
    let pool = common::create_test_db().await;
    let scenario = common::fixture_scenario(&pool).await;
    let migration = common::fixture_migration(&pool, &scenario, &[&scenario.b]).await;

    SqliteCatalog::new(pool.clone())
        .set_migration_state(&migration.id, MigrationState::Running, None)
        .await
        .unwrap();

    let state = test_state(pool);
    recover_interrupted_runs(&state.orchestrator).await.unwrap();

    let client = common::TestClient {
        app: vmigrate_api::create_app(state).await.unwrap(),
    };
    let response = client
        .post_empty(
            &format!("/api/v1/migrations/{}/run", migration.id),
            Some(common::auth_headers("operator")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = common::extract_json_body(response).await;
    assert_eq!(json["migration_state"], "success");
}
