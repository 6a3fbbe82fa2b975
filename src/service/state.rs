//! Service state management.
//!
//! Contains the shared handles every request handler works with.

use std::sync::Arc;
use std::time::Duration;

use crate::store::{TravelStore, STORE_DEADLINE};
use crate::token::TokenAuthority;

/// Shared service state.
///
/// Built once at startup and handed to the router; handlers only read it.
pub struct ServiceState<S: TravelStore + 'static> {
    /// The travel store.
    pub store: Arc<S>,
    /// Issues and verifies bearer tokens.
    pub tokens: Arc<TokenAuthority>,
    /// Deadline applied to each store call.
    pub store_deadline: Duration,
}

impl<S: TravelStore + 'static> ServiceState<S> {
    /// Create service state with the default store deadline.
    pub fn new(store: S, tokens: TokenAuthority) -> Self {
        Self::with_shared_store(Arc::new(store), tokens)
    }

    /// Create service state around a store the caller keeps a handle to.
    pub fn with_shared_store(store: Arc<S>, tokens: TokenAuthority) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            store_deadline: STORE_DEADLINE,
        }
    }

    /// Override the store deadline.
    pub fn with_store_deadline(mut self, deadline: Duration) -> Self {
        self.store_deadline = deadline;
        self
    }
}

impl<S: TravelStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
            store_deadline: self.store_deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTravelStore;

    #[test]
    fn test_state_defaults_to_store_deadline() {
        let state = ServiceState::new(InMemoryTravelStore::new(), TokenAuthority::new(b"k", 5));
        assert_eq!(state.store_deadline, Duration::from_secs(20));
    }

    #[test]
    fn test_clone_shares_store() {
        let store = Arc::new(InMemoryTravelStore::new());
        let state = ServiceState::with_shared_store(Arc::clone(&store), TokenAuthority::new(b"k", 5))
            .with_store_deadline(Duration::from_millis(50));
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&cloned.store, &store));
        assert_eq!(cloned.store_deadline, Duration::from_millis(50));
    }
}
