//! Travel Service Binary
//!
//! Runs the travel REST API:
//! - Structured JSON logging
//! - Request tracing with trace ids (outside production)
//! - Graceful shutdown handling
//! - MongoDB connection closed on exit
//!
//! ## Configuration
//!
//! Environment variables (a `.env` file in the working directory is loaded first):
//! - `PORT`, `HOST`: Listen address (default: 0.0.0.0:8080)
//! - `DATABASE_URI`, `DATABASE_NAME`, `TRAVEL_COLLECTION`: MongoDB location
//! - `JWT_SECRET_KEY`: HS256 secret (required in production)
//! - `JWT_SECRET_KEY_EXPIRE_MINUTES_COUNT`: Token lifetime in minutes (default: 15)
//! - `SERVER_READ_TIMEOUT`: Request timeout in seconds, 0 disables (default: 60)
//! - `APP_ENVIRONMENT`: `production` disables request logging and CORS
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URI=mongodb://localhost:27017 JWT_SECRET_KEY=... cargo run --bin travel_service
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use travel_service::service::{create_router, request_logging_middleware, ServiceState};
use travel_service::{MongoTravelStore, ServiceConfig, TokenAuthority, TravelStore};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "travel_service=info,tower_http=info,mongodb=warn".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    let version = env!("CARGO_PKG_VERSION");
    info!(
        version = version,
        environment = %config.environment,
        "Starting Travel Service"
    );

    info!("Connecting to MongoDB...");
    let connect_start = Instant::now();
    let store = match MongoTravelStore::connect(&config.mongo()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "Failed to connect to MongoDB");
            return Err(e.into());
        }
    };
    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        "MongoDB connection established"
    );

    let tokens = TokenAuthority::new(&config.jwt_secret, config.token_lifetime_minutes);
    info!(
        token_lifetime_minutes = config.token_lifetime_minutes,
        "Token authority initialized"
    );

    let state = ServiceState::with_shared_store(Arc::clone(&store), tokens);
    let mut app = create_router(state);

    if let Some(timeout) = config.read_timeout {
        app = app.layer(TimeoutLayer::new(timeout));
    }

    if !config.environment.is_production() {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors);
    }

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, version = version, "Travel Service listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = store.close().await {
        error!(error = %e, "Failed to close MongoDB connection");
    }
    served?;

    info!("Travel Service shutdown complete");
    Ok(())
}
