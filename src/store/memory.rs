//! In-memory travel store for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{parse_id, StoreError, TravelStore};
use crate::types::{FieldUpdate, Travel, TravelId};

/// In-memory travel store for testing.
///
/// Uses a BTreeMap keyed by id, so iteration follows id creation order.
#[derive(Debug, Default)]
pub struct InMemoryTravelStore {
    travels: RwLock<BTreeMap<TravelId, Travel>>,
    closed: AtomicBool,
}

impl InMemoryTravelStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with travels, keeping their ids.
    pub fn with_travels(travels: impl IntoIterator<Item = Travel>) -> Self {
        let store = Self::new();
        {
            let mut map = store.travels.write();
            for travel in travels {
                map.insert(travel.id, travel);
            }
        }
        store
    }

    /// Number of stored travels.
    pub fn len(&self) -> usize {
        self.travels.read().len()
    }

    /// Whether the store holds no travels.
    pub fn is_empty(&self) -> bool {
        self.travels.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl TravelStore for InMemoryTravelStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn find_all(&self) -> Result<Vec<Travel>, StoreError> {
        self.ensure_open()?;
        Ok(self.travels.read().values().cloned().collect())
    }

    async fn find_one(&self, id: &str) -> Result<Travel, StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        self.travels
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert_one(&self, travel: &mut Travel) -> Result<(), StoreError> {
        self.ensure_open()?;
        travel.id = TravelId::new();
        self.travels.write().insert(travel.id, travel.clone());
        Ok(())
    }

    async fn update_one(&self, id: &str, travel: &mut Travel) -> Result<(), StoreError> {
        self.ensure_open()?;
        travel.id = parse_id(id)?;
        if let Some(stored) = self.travels.write().get_mut(&travel.id) {
            *stored = travel.clone();
        }
        Ok(())
    }

    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<(), StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        if let Some(stored) = self.travels.write().get_mut(&id) {
            stored.apply(&update);
        }
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        self.travels.write().remove(&id);
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_fresh_id() {
        let store = InMemoryTravelStore::new();
        let supplied = TravelId::new();
        let mut travel = Travel::new("Cairo", "cairo.jpg", false).with_id(supplied);

        store.insert_one(&mut travel).await.unwrap();

        assert_ne!(travel.id, supplied);
        assert!(!travel.id.is_nil());
        let stored = store.find_one(&travel.id.to_hex()).await.unwrap();
        assert_eq!(stored, travel);
    }

    #[tokio::test]
    async fn test_find_all_in_insertion_order() {
        let store = InMemoryTravelStore::new();
        let mut first = Travel::new("Paris", "", false);
        let mut second = Travel::new("Berlin", "", true);
        store.insert_one(&mut first).await.unwrap();
        store.insert_one(&mut second).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_one_invalid_and_missing() {
        let store = InMemoryTravelStore::new();

        let invalid = store.find_one("zzz").await.unwrap_err();
        assert!(matches!(invalid, StoreError::InvalidArgument(_)));

        let missing = store.find_one(&TravelId::new().to_hex()).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let store = InMemoryTravelStore::new();
        let mut travel = Travel::new("Quito", "quito.png", false);
        store.insert_one(&mut travel).await.unwrap();
        let id = travel.id.to_hex();

        let mut replacement = Travel::new("Quito", "", true);
        store.update_one(&id, &mut replacement).await.unwrap();

        let stored = store.find_one(&id).await.unwrap();
        assert_eq!(stored.id, travel.id);
        assert_eq!(stored.photo, "");
        assert!(stored.done);
    }

    #[tokio::test]
    async fn test_update_field_sets_single_field() {
        let store = InMemoryTravelStore::new();
        let mut travel = Travel::new("Lima", "lima.png", false);
        store.insert_one(&mut travel).await.unwrap();
        let id = travel.id.to_hex();

        store.update_field(&id, FieldUpdate::Done(true)).await.unwrap();

        let stored = store.find_one(&id).await.unwrap();
        assert!(stored.done);
        assert_eq!(stored.name, "Lima");
        assert_eq!(stored.photo, "lima.png");
    }

    #[tokio::test]
    async fn test_missing_id_writes_are_noops() {
        // update/delete of an unknown id succeed without creating anything
        let store = InMemoryTravelStore::new();
        let ghost = TravelId::new().to_hex();

        store.update_one(&ghost, &mut Travel::new("Ghost", "", false)).await.unwrap();
        store.update_field(&ghost, FieldUpdate::Done(true)).await.unwrap();
        store.delete_one(&ghost).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_writes_reject_invalid_id() {
        let store = InMemoryTravelStore::new();
        let update = store.update_one("nope", &mut Travel::default()).await;
        let delete = store.delete_one("nope").await;

        assert!(matches!(update, Err(StoreError::InvalidArgument(_))));
        assert!(matches!(delete, Err(StoreError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = InMemoryTravelStore::new();
        store.close().await.unwrap();

        assert_eq!(store.ping().await, Err(StoreError::Closed));
        assert_eq!(store.find_all().await, Err(StoreError::Closed));
        assert_eq!(
            store.insert_one(&mut Travel::default()).await,
            Err(StoreError::Closed)
        );
    }
}
