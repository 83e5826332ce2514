use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vmigrate_api::{create_app, recover_interrupted_runs, AppState, Config};
use vmigrate_orchestrator::db::{backup_database, create_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("vmigrate_api=debug,vmigrate_orchestrator=debug,tower_http=debug")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting vmigrate-api service...");

    // Load configuration
    let config = Config::from_env();
    info!(
        "Configuration loaded: bind_addr={}, db_path={}, transfer_delay_ms={}, transfer_timeout_secs={}",
        config.bind_addr,
        config.db_path.display(),
        config.transfer_delay_ms,
        config.transfer_timeout_secs
    );

    // Database setup
    let db_path = &config.db_path;
    info!("Database path: {}", db_path.display());

    // Backup before migrations
    if db_path.exists() {
        let backup_path = backup_database(db_path)?;
        info!("Database backed up to: {}", backup_path.display());
    }

    // Create pool and run migrations
    let pool = create_pool(db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    let state = AppState::new(pool, &config);

    // Nothing has been claimed yet, so any `running` record is stale
    recover_interrupted_runs(&state.orchestrator).await?;

    // Create app
    let app = create_app(state).await?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
