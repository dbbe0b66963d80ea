// Flash sale API server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, Router};
use flashsale_migration::{Migrator, MigratorTrait};
use tokio::sync::watch;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashsale_api::config::AppConfig;
use flashsale_api::db::DbPool;
use flashsale_api::error::INTERNAL_ERROR_MSG;
use flashsale_api::handlers::{
    checkout, health_check, purchase, status, throttle_requests, AppState,
};
use flashsale_api::kv::ReservationStore;
use flashsale_api::services::finalizer;
use flashsale_api::services::flash_sale::FlashSaleService;
use flashsale_api::services::throttle::TokenBucket;

/// Read/write bound applied to every request handler.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    // Configure logging with tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load API configuration from environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    tracing::info!("Configuration loaded");

    // Establish database connection pool and bring the schema up to date
    let db_pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    Migrator::up(db_pool.get_connection(), None)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database schema up to date");

    // Connect to Redis for the reservation state
    let kv = ReservationStore::connect(
        &config.redis.url(),
        config.reservation_timeout,
        config.limits,
    )
    .await
    .expect("Failed to connect to Redis");
    kv.ping().await.expect("Redis ping failed");
    tracing::info!("Connected to Redis");

    // Wire the coordinator over both stores
    let repositories = db_pool.repositories();
    let service = Arc::new(FlashSaleService::new(repositories.sales, kv, config.limits));

    // Start the hourly finalization task
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let finalizer_task = tokio::spawn(finalizer::run(service.clone(), shutdown_rx));

    let app_state = AppState {
        service,
        throttle: Arc::new(TokenBucket::new(
            config.throttle.rate_per_sec,
            config.throttle.burst,
        )),
    };

    // Set up API routes
    let app = Router::new()
        .route("/checkout", post(checkout))
        .route("/purchase", post(purchase))
        .route("/status", get(status))
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            throttle_requests,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            // tower's Timeout is fallible; HandleErrorLayer turns the elapsed
            // error into a response so the router stays infallible
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Parse server address from config
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");

    // Start HTTP server with graceful shutdown
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .expect("Failed to start server");

    if let Err(err) = finalizer_task.await {
        tracing::warn!("Finalizer task ended abnormally: {}", err);
    }
    tracing::info!("Server stopped gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Converts a timed-out (or otherwise failed) middleware stack into the
/// generic JSON 500.
async fn handle_timeout_error(err: BoxError) -> axum::response::Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out after {:?}", REQUEST_TIMEOUT);
    } else {
        tracing::error!("request middleware error: {}", err);
    }

    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(serde_json::json!({ "error": INTERNAL_ERROR_MSG })),
    )
        .into_response()
}

/// Converts a handler panic into the generic JSON 500 without taking the
/// process down.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panic: {}", detail);

    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(serde_json::json!({ "error": INTERNAL_ERROR_MSG })),
    )
        .into_response()
}
