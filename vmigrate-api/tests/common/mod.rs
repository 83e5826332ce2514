//! Common test utilities and helpers for vmigrate-api tests
//!
//! This module provides shared functionality for all test files to reduce code duplication
//! and improve maintainability of the test suite.

#![allow(dead_code)]

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use vmigrate_api::AppState;
use vmigrate_orchestrator::{
    test_utils, MigrationTarget, MountPoint, SimulatedTransfer, SqliteCatalog, TransferExecutor,
    Workload,
};

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    test_utils::create_test_db().await
}

/// Create a test app whose runs finish immediately
pub async fn create_test_app(pool: SqlitePool) -> Router {
    create_test_app_with_executor(pool, Arc::new(SimulatedTransfer::default())).await
}

/// Create a test app around a specific transfer executor
pub async fn create_test_app_with_executor(
    pool: SqlitePool,
    executor: Arc<dyn TransferExecutor>,
) -> Router {
    let state = AppState::with_executor(pool, executor, Duration::from_secs(5));

    vmigrate_api::create_app(state)
        .await
        .expect("Failed to create test app")
}

/// Catalog records for a source workload with storage {a, b}, an unrelated
/// mount point c, and one empty migration target.
pub struct Scenario {
    pub a: MountPoint,
    pub b: MountPoint,
    pub c: MountPoint,
    pub source: Workload,
    pub target: MigrationTarget,
}

/// Fixture: Create the standard catalog scenario
pub async fn fixture_scenario(pool: &SqlitePool) -> Scenario {
    let catalog = SqliteCatalog::new(pool.clone());

    let a = test_utils::fixture_mount_point(&catalog, "/data", 100).await;
    let b = test_utils::fixture_mount_point(&catalog, "/var/log", 20).await;
    let c = test_utils::fixture_mount_point(&catalog, "/srv", 50).await;
    let source = test_utils::fixture_workload(&catalog, "10.0.0.5", &[&a, &b]).await;
    let target = test_utils::fixture_target(&catalog).await;

    Scenario {
        a,
        b,
        c,
        source,
        target,
    }
}

/// Fixture: Create a migration of the scenario's source selecting `selected`
pub async fn fixture_migration(
    pool: &SqlitePool,
    scenario: &Scenario,
    selected: &[&MountPoint],
) -> vmigrate_orchestrator::Migration {
    let catalog = SqliteCatalog::new(pool.clone());

    test_utils::fixture_migration(&catalog, &scenario.source, &scenario.target, selected).await
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// Helper to create authenticated request headers
pub fn auth_headers(username: &str) -> Vec<(&'static str, &str)> {
    vec![("x-user", username)]
}

/// TestClient to encapsulate API interaction logic
pub struct TestClient {
    pub app: Router,
}

impl TestClient {
    /// Create a new TestClient
    pub async fn new(pool: SqlitePool) -> Self {
        let app = create_test_app(pool).await;
        Self { app }
    }

    /// Create a new TestClient with a new in-memory DB
    pub async fn new_with_db() -> (Self, SqlitePool) {
        let pool = create_test_db().await;
        let client = Self::new(pool.clone()).await;
        (client, pool)
    }

    /// Send a request to the API
    pub async fn send_request(
        &self,
        request: axum::http::Request<axum::body::Body>,
    ) -> axum::http::Response<axum::body::Body> {
        // Clone the app to allow reuse (Router is cheap to clone)
        use tower::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Send a JSON body with the given method
    pub async fn send_json<T: serde::Serialize>(
        &self,
        method: &str,
        uri: &str,
        body: &T,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        let req_body = serde_json::to_string(body).expect("Failed to serialize request body");
        let mut builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");

        if let Some(h) = headers {
            for (k, v) in h {
                builder = builder.header(k, v);
            }
        }

        let request = builder.body(axum::body::Body::from(req_body)).unwrap();
        self.send_request(request).await
    }

    /// Post JSON to an endpoint
    pub async fn post<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        self.send_json("POST", uri, body, headers).await
    }

    /// Patch JSON to an endpoint
    pub async fn patch<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        self.send_json("PATCH", uri, body, headers).await
    }

    /// Post to an endpoint without a body
    pub async fn post_empty(
        &self,
        uri: &str,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        self.send_empty("POST", uri, headers).await
    }

    /// Get request to an endpoint
    pub async fn get(
        &self,
        uri: &str,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        self.send_empty("GET", uri, headers).await
    }

    /// Delete request to an endpoint
    pub async fn delete(
        &self,
        uri: &str,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        self.send_empty("DELETE", uri, headers).await
    }

    async fn send_empty(
        &self,
        method: &str,
        uri: &str,
        headers: Option<Vec<(&str, &str)>>,
    ) -> axum::http::Response<axum::body::Body> {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);

        if let Some(h) = headers {
            for (k, v) in h {
                builder = builder.header(k, v);
            }
        }

        let request = builder.body(axum::body::Body::empty()).unwrap();
        self.send_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_db() {
        let pool = create_test_db().await;

        // Verify tables exist
        let result: Result<(i64,), _> = sqlx::query_as("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fixture_scenario() {
        let pool = create_test_db().await;
        let scenario = fixture_scenario(&pool).await;

        assert_eq!(scenario.source.storage.len(), 2);
        assert!(scenario.source.storage.contains(&scenario.a.id));
        assert!(!scenario.source.storage.contains(&scenario.c.id));
        assert_eq!(scenario.target.target_vm, None);
    }
}
