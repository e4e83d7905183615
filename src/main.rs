// [library] Error handling crate - `Result<T>` is `Result<T, anyhow::Error>`
use anyhow::Result;
use std::{sync::Arc, time::Duration};

// [business] Library crate - configuration, storage, routing
use eusou::{
    create_app_router,
    db::{create_pool, PgWorkerStore, WorkerStore},
    health::spawn_health_monitor,
    web::cors_layer,
    AppState, Config,
};

// [library] Tower ecosystem - HTTP request/response logging middleware
use tower_http::trace::TraceLayer;

// [library] Structured logging framework
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // [library] Initialize structured logging - RUST_LOG overrides the default filter
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eusou=info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting eusou - worker self-service API");

    // [business] Load configuration once; a missing SECRET_KEY stops startup here
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // [business] Database connection establishment with automatic migrations
    info!("Connecting to database...");
    let db = create_pool(config.database_url(), config.db_max_connections).await?;
    info!("Database connection established and migrations applied");

    let store: Arc<dyn WorkerStore> = Arc::new(PgWorkerStore::new(db));

    // [business] Background liveness check, independent of request handling
    spawn_health_monitor(
        store.clone(),
        Duration::from_secs(config.health_check_interval_secs),
    );

    info!("Setting up routes...");
    let cors = cors_layer(&config.allowed_origins);
    let app = create_app_router(AppState::new(store, config))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Server starting on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
