//! # travel-service
//!
//! CRUD over travel records in a document store, served as a REST API.
//!
//! ## Core Contract
//!
//! 1. Reads (list, fetch by id), health checks, and token issuance are public
//! 2. Create, replace, and delete require a bearer token that verifies and has not expired
//! 3. Every store call runs under its own 20 second deadline
//!
//! ## Architecture
//!
//! ```text
//! HTTP request → Router → (protected) TokenAuthority → Handler → TravelStore
//!                                                                  ↓
//!                                                    MongoDB or in-memory
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod store;
pub mod token;
pub mod types;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use config::{AppEnvironment, ConfigError, ServiceConfig, MAX_TOKEN_LIFETIME_MINUTES};
pub use store::{with_deadline, InMemoryTravelStore, StoreError, TravelStore, STORE_DEADLINE};
#[cfg(feature = "mongo")]
pub use store::{MongoConfig, MongoTravelStore};
pub use token::{TokenAuthority, TokenClaims, TokenError};
pub use types::{FieldUpdate, Travel, TravelId, TravelIdError};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};
