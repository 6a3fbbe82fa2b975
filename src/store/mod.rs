//! Travel storage backends.

pub mod memory;

#[cfg(feature = "mongo")]
pub mod mongo;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{FieldUpdate, Travel, TravelId};

/// Deadline applied to every store operation issued by a request handler.
pub const STORE_DEADLINE: Duration = Duration::from_secs(20);

/// Error type shared by all store backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Store unreachable.
    #[error("connection error: {0}")]
    Connectivity(String),
    /// Operation deadline exceeded.
    #[error("operation exceeded deadline of {0:?}")]
    Timeout(Duration),
    /// Malformed identifier.
    #[error("{0}")]
    InvalidArgument(String),
    /// No matching record.
    #[error("no travel found with id {0}")]
    NotFound(String),
    /// Cursor, read, or write failure.
    #[error("{0}")]
    Io(String),
    /// Store used after `close`.
    #[error("travel store is closed")]
    Closed,
}

/// Parse a path identifier, mapping failures to `InvalidArgument`.
pub fn parse_id(id: &str) -> Result<TravelId, StoreError> {
    id.parse()
        .map_err(|e: crate::types::TravelIdError| StoreError::InvalidArgument(e.to_string()))
}

/// Run a store future under a deadline.
///
/// The future is dropped when the deadline elapses.
pub async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(deadline)),
    }
}

/// Trait for travel storage backends.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait TravelStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch every travel in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Travel>, StoreError>;

    /// Fetch a travel by hex id.
    async fn find_one(&self, id: &str) -> Result<Travel, StoreError>;

    /// Persist a travel under a freshly assigned id, written back into `travel`.
    async fn insert_one(&self, travel: &mut Travel) -> Result<(), StoreError>;

    /// Replace the travel stored under `id`. A missing record is a no-op.
    async fn update_one(&self, id: &str, travel: &mut Travel) -> Result<(), StoreError>;

    /// Set a single field on the travel stored under `id`. A missing record is a no-op.
    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<(), StoreError>;

    /// Remove the travel stored under `id`. A missing record is a no-op.
    async fn delete_one(&self, id: &str) -> Result<(), StoreError>;

    /// Release the backend. Later calls fail with `StoreError::Closed`.
    async fn close(&self) -> Result<(), StoreError>;
}

pub use memory::InMemoryTravelStore;

#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoTravelStore};
