//! Asset Booking Server
//!
//! Device inventory and booking REST API.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use asset_booking_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Asset Booking Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let repository = Repository::new(pool);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(repository)),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the tracing subscriber: stdout in pretty or JSON form, plus a
/// daily rolling file when a log directory is configured.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("asset_booking_server={},tower_http=debug", logging.level).into()
    });

    let stdout = if logging.format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file, guard) = match logging.directory.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "asset-booking-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();

    guard
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Locations
        .route(
            "/locations",
            get(api::locations::list_locations).post(api::locations::create_location),
        )
        .route(
            "/locations/:id",
            get(api::locations::get_location)
                .put(api::locations::update_location)
                .delete(api::locations::delete_location),
        )
        // Persons
        .route(
            "/persons",
            get(api::persons::list_persons).post(api::persons::create_person),
        )
        .route(
            "/persons/:id",
            get(api::persons::get_person)
                .put(api::persons::update_person)
                .delete(api::persons::delete_person),
        )
        // Devices
        .route(
            "/devices",
            get(api::devices::list_devices).post(api::devices::create_device),
        )
        .route("/devices/export", get(api::devices::export_devices))
        .route(
            "/devices/:asset_num",
            get(api::devices::get_device)
                .put(api::devices::update_device)
                .delete(api::devices::delete_device),
        )
        .route("/devices/:asset_num/bookings", get(api::devices::get_device_bookings))
        // Bookings
        .route(
            "/bookings",
            get(api::bookings::list_bookings).post(api::bookings::create_booking),
        )
        .route(
            "/bookings/:id",
            get(api::bookings::get_booking)
                .put(api::bookings::update_booking)
                .delete(api::bookings::delete_booking),
        )
        .route("/bookings/:id/return", post(api::bookings::return_booking))
        // Audit log
        .route("/audit", get(api::audit::list_audit))
        .route("/audit/:id", get(api::audit::get_audit_entry))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
}
