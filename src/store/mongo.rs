//! MongoDB travel store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URI`: MongoDB connection string (default: `mongodb://localhost:27017`)
//! - `DATABASE_NAME`: Database holding the travel collection (default: `travels`)
//! - `TRAVEL_COLLECTION`: Collection name (default: `travels`)

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::{parse_id, with_deadline, StoreError, TravelStore};
use crate::types::{FieldUpdate, Travel};

/// Configuration for the MongoDB connection.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Collection holding travel documents.
    pub collection: String,
    /// Bound on client setup and the startup ping.
    pub connect_timeout: Duration,
}

impl MongoConfig {
    /// Create a configuration with the default connect timeout.
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
            connect_timeout: super::STORE_DEADLINE,
        }
    }
}

/// Stored shape of a travel, keyed by the native `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDocument {
    /// Primary key.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Free-text label.
    pub name: String,
    /// Photo URI or path.
    pub photo: String,
    /// Completion flag.
    pub done: bool,
}

impl From<&Travel> for TravelDocument {
    fn from(travel: &Travel) -> Self {
        Self {
            id: travel.id.as_object_id(),
            name: travel.name.clone(),
            photo: travel.photo.clone(),
            done: travel.done,
        }
    }
}

impl From<TravelDocument> for Travel {
    fn from(doc: TravelDocument) -> Self {
        Travel::new(doc.name, doc.photo, doc.done).with_id(doc.id.into())
    }
}

/// MongoDB travel store.
///
/// The driver pools connections internally, so one store is shared by
/// every request.
pub struct MongoTravelStore {
    client: Client,
    collection: Collection<TravelDocument>,
    closed: AtomicBool,
}

impl MongoTravelStore {
    /// Connect and ping the primary within `config.connect_timeout`.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            connect_timeout_secs = config.connect_timeout.as_secs(),
            "Initializing MongoDB client"
        );

        let store = with_deadline(config.connect_timeout, async {
            let options = ClientOptions::parse(&config.uri)
                .await
                .map_err(|e| StoreError::Connectivity(e.to_string()))?;
            let client =
                Client::with_options(options).map_err(|e| StoreError::Connectivity(e.to_string()))?;
            let collection = client
                .database(&config.database)
                .collection::<TravelDocument>(&config.collection);
            Ok(Self {
                client,
                collection,
                closed: AtomicBool::new(false),
            })
        })
        .await?;

        with_deadline(config.connect_timeout, store.ping()).await?;
        tracing::info!("MongoDB client connected");

        Ok(store)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

fn io_error(e: mongodb::error::Error) -> StoreError {
    StoreError::Io(e.to_string())
}

#[async_trait]
impl TravelStore for MongoTravelStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Connectivity(e.to_string()))?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Travel>, StoreError> {
        self.ensure_open()?;
        let cursor = self.collection.find(doc! {}, None).await.map_err(io_error)?;
        let documents: Vec<TravelDocument> = cursor.try_collect().await.map_err(io_error)?;
        Ok(documents.into_iter().map(Travel::from).collect())
    }

    async fn find_one(&self, id: &str) -> Result<Travel, StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        self.collection
            .find_one(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(io_error)?
            .map(Travel::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert_one(&self, travel: &mut Travel) -> Result<(), StoreError> {
        self.ensure_open()?;
        travel.id = ObjectId::new().into();
        self.collection
            .insert_one(TravelDocument::from(&*travel), None)
            .await
            .map_err(io_error)?;
        Ok(())
    }

    async fn update_one(&self, id: &str, travel: &mut Travel) -> Result<(), StoreError> {
        self.ensure_open()?;
        travel.id = parse_id(id)?;
        let result = self
            .collection
            .replace_one(
                doc! { "_id": travel.id.as_object_id() },
                TravelDocument::from(&*travel),
                None,
            )
            .await
            .map_err(io_error)?;
        if result.matched_count == 0 {
            tracing::debug!(travel_id = %travel.id, "replace matched no travel");
        }
        Ok(())
    }

    async fn update_field(&self, id: &str, update: FieldUpdate) -> Result<(), StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        let set = match &update {
            FieldUpdate::Name(name) => doc! { "name": name.as_str() },
            FieldUpdate::Photo(photo) => doc! { "photo": photo.as_str() },
            FieldUpdate::Done(done) => doc! { "done": *done },
        };
        self.collection
            .update_one(doc! { "_id": id.as_object_id() }, doc! { "$set": set }, None)
            .await
            .map_err(io_error)?;
        tracing::debug!(travel_id = %id, field = update.field(), "travel field updated");
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let id = parse_id(id)?;
        self.collection
            .delete_one(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(io_error)?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TravelId;

    #[test]
    fn test_document_roundtrip_keeps_id() {
        let id = TravelId::new();
        let travel = Travel::new("Hanoi", "hanoi.jpg", true).with_id(id);

        let document = TravelDocument::from(&travel);
        assert_eq!(document.id, id.as_object_id());
        assert_eq!(Travel::from(document), travel);
    }

    #[test]
    fn test_document_uses_native_primary_key() {
        let travel = Travel::new("Accra", "", false).with_id(TravelId::new());
        let bson = bson::to_document(&TravelDocument::from(&travel)).unwrap();

        assert!(matches!(bson.get("_id"), Some(bson::Bson::ObjectId(_))));
        assert!(bson.get("id").is_none());
        assert_eq!(bson.get_str("name").unwrap(), "Accra");
    }

    #[test]
    fn test_config_defaults_connect_timeout() {
        let config = MongoConfig::new("mongodb://localhost:27017", "db", "travels");
        assert_eq!(config.connect_timeout, Duration::from_secs(20));
    }
}
