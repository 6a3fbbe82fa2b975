//! Axum routes for the travel service.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::auth::BearerClaims;
use super::error::{ApiError, TokenEnvelope};
use super::middleware::record_store_operation;
use super::state::ServiceState;
use crate::store::{with_deadline, StoreError, TravelStore};
use crate::types::Travel;

/// Path prefix for every route.
pub const API_PREFIX: &str = "/api/v1";

// ============================================================================
// Response Types
// ============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub health: String,
    /// HTTP status code echoed in the body.
    pub status: u16,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service can take traffic.
    pub ready: bool,
    /// Whether the store answered a ping.
    pub database: bool,
    /// Store error when not ready.
    pub details: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Run a store operation under a deadline, recording its latency.
async fn run_store<T, F>(
    deadline: Duration,
    operation: &'static str,
    future: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let start = Instant::now();
    let result = with_deadline(deadline, future).await;
    record_store_operation(
        operation,
        start.elapsed().as_millis() as u64,
        result.is_ok(),
    );
    result
}

/// Resolve the optional `:id` segment, rejecting an empty one.
fn require_id(id: Option<Path<String>>) -> Result<String, ApiError> {
    match id {
        Some(Path(id)) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::MissingId),
    }
}

fn require_body(body: Result<Json<Travel>, JsonRejection>) -> Result<Travel, ApiError> {
    body.map(|Json(travel)| travel)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Liveness probe.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        health: "ok".to_string(),
        status: StatusCode::OK.as_u16(),
    })
}

/// Readiness probe.
///
/// Returns 200 if the store answers a ping, 503 otherwise.
async fn readiness_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    match run_store(state.store_deadline, "ping", state.store.ping()).await {
        Ok(()) => Ok(Json(ReadinessResponse {
            ready: true,
            database: true,
            details: None,
        })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                database: false,
                details: Some(e.to_string()),
            }),
        )),
    }
}

/// Issue a new access token.
async fn new_token_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<TokenEnvelope>, ApiError> {
    let token = state.tokens.issue().map_err(ApiError::Issuance)?;
    Ok(Json(TokenEnvelope::issued(token)))
}

/// List every travel.
async fn list_travels_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<Vec<Travel>>, ApiError> {
    let travels = run_store(state.store_deadline, "find_all", state.store.find_all()).await?;
    Ok(Json(travels))
}

/// Fetch one travel.
async fn get_travel_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    id: Option<Path<String>>,
) -> Result<Json<Travel>, ApiError> {
    let id = require_id(id)?;
    let travel = run_store(state.store_deadline, "find_one", state.store.find_one(&id)).await?;
    Ok(Json(travel))
}

/// Create a travel and return it with its assigned id.
async fn create_travel_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    claims: BearerClaims,
    body: Result<Json<Travel>, JsonRejection>,
) -> Result<Json<Travel>, ApiError> {
    claims.ensure_fresh()?;
    let mut travel = require_body(body)?;

    run_store(state.store_deadline, "insert_one", state.store.insert_one(&mut travel)).await?;
    tracing::info!(travel_id = %travel.id, "Travel created");
    Ok(Json(travel))
}

/// Replace a travel.
async fn update_travel_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    claims: BearerClaims,
    id: Option<Path<String>>,
    body: Result<Json<Travel>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    claims.ensure_fresh()?;
    let id = require_id(id)?;
    let mut travel = require_body(body)?;

    run_store(state.store_deadline, "update_one", state.store.update_one(&id, &mut travel)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a travel.
async fn delete_travel_handler<S: TravelStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    claims: BearerClaims,
    id: Option<Path<String>>,
) -> Result<StatusCode, ApiError> {
    claims.ensure_fresh()?;
    let id = require_id(id)?;

    run_store(state.store_deadline, "delete_one", state.store.delete_one(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown routes.
async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(super::error::ErrorBody {
            error: "route not found".to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the travel service.
///
/// Reads, token issuance, and health checks are public; create, update,
/// and delete require a bearer token. The trailing-slash travel route
/// reaches the id-taking handlers with no id.
pub fn create_router<S: TravelStore + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    let api = Router::new()
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler::<S>))
        // Token issuance
        .route("/token/new", get(new_token_handler::<S>))
        // Travels
        .route(
            "/travels",
            get(list_travels_handler::<S>).post(create_travel_handler::<S>),
        )
        .route(
            "/travels/",
            get(get_travel_handler::<S>)
                .put(update_travel_handler::<S>)
                .delete(delete_travel_handler::<S>),
        )
        .route(
            "/travels/:id",
            get(get_travel_handler::<S>)
                .put(update_travel_handler::<S>)
                .delete(delete_travel_handler::<S>),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(not_found_handler)
        .with_state(state)
}
