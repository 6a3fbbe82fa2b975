//! Travel REST Service
//!
//! Exposes the travel store over HTTP, with bearer-token protected writes.
//!
//! ## Endpoints (under `/api/v1`)
//!
//! - `GET /health` - Liveness probe
//! - `GET /health/ready` - Readiness probe (store ping)
//! - `GET /token/new` - Issue an access token
//! - `GET /travels` - List travels
//! - `GET /travels/:id` - Fetch a travel
//! - `POST /travels` - Create a travel (bearer token)
//! - `PUT /travels/:id` - Replace a travel (bearer token)
//! - `DELETE /travels/:id` - Delete a travel (bearer token)

pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::BearerClaims;
pub use error::{ApiError, ErrorBody, TokenEnvelope};
pub use middleware::{record_store_operation, record_token_verification, request_logging_middleware};
pub use routes::{create_router, API_PREFIX};
pub use state::ServiceState;
