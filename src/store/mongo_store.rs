//! MongoDB session collection
//!
//! Documents have the shape `{_id: ObjectId, data: String, last_modified: Date}`.
//! Expiry is delegated to a TTL index on `last_modified`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::{CreateIndexOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};

use super::SessionCollection;
use crate::error::SessionError;
use crate::expiry::{TtlIndex, PROVISION_TIMEOUT};
use crate::id::SessionId;
use crate::record::SessionRecord;

/// Session collection backed by a MongoDB collection
///
/// # Example
///
/// ```rust,ignore
/// use salvo_mongo_session::MongoCollection;
///
/// let collection = MongoCollection::from_url("mongodb://127.0.0.1:27017", "app", "sessions").await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoCollection {
    database: Database,
    collection: Collection<Document>,
}

impl MongoCollection {
    /// Use the collection `name` in `database`
    pub fn new(database: Database, name: &str) -> Self {
        let collection = database.collection::<Document>(name);
        Self {
            database,
            collection,
        }
    }

    /// Connect from a connection string
    pub async fn from_url(url: &str, database: &str, collection: &str) -> Result<Self, SessionError> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| SessionError::Connection(format!("Failed to create MongoDB client: {}", e)))?;
        Ok(Self::new(client.database(database), collection))
    }

    /// The underlying driver collection
    pub fn inner(&self) -> &Collection<Document> {
        &self.collection
    }
}

fn record_from_document(id: SessionId, doc: &Document) -> Result<SessionRecord, SessionError> {
    let data = doc
        .get_str("data")
        .map_err(|e| SessionError::Store(format!("malformed session document: {}", e)))?;
    let last_modified = doc
        .get_datetime("last_modified")
        .map_err(|e| SessionError::Store(format!("malformed session document: {}", e)))?;
    let last_modified = DateTime::<Utc>::from_timestamp_millis(last_modified.timestamp_millis())
        .ok_or_else(|| SessionError::Store("last_modified out of range".to_string()))?;

    Ok(SessionRecord {
        id,
        data: data.to_string(),
        last_modified,
    })
}

#[async_trait]
impl SessionCollection for MongoCollection {
    async fn ping(&self) -> Result<(), SessionError> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn ensure_ttl_index(&self, index: &TtlIndex) -> Result<(), SessionError> {
        let mut keys = Document::new();
        keys.insert(index.field, 1i32);

        let mut index_options = IndexOptions::default();
        index_options.expire_after = Some(index.expire_after());

        let mut model = IndexModel::default();
        model.keys = keys;
        model.options = Some(index_options);

        let mut create_options = CreateIndexOptions::default();
        create_options.max_time = Some(PROVISION_TIMEOUT);

        self.collection.create_index(model, create_options).await?;
        Ok(())
    }

    async fn find_one(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let oid = ObjectId::from_bytes(id.bytes());
        match self.collection.find_one(doc! { "_id": oid }, None).await? {
            Some(doc) => Ok(Some(record_from_document(*id, &doc)?)),
            None => Ok(None),
        }
    }

    async fn upsert_one(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let oid = ObjectId::from_bytes(record.id.bytes());
        let update = doc! {
            "$set": {
                "data": record.data.as_str(),
                "last_modified": BsonDateTime::from_millis(record.last_modified.timestamp_millis()),
            }
        };

        let mut options = UpdateOptions::default();
        options.upsert = Some(true);

        self.collection
            .update_one(doc! { "_id": oid }, update, options)
            .await?;
        Ok(())
    }

    async fn delete_one(&self, id: &SessionId) -> Result<bool, SessionError> {
        let oid = ObjectId::from_bytes(id.bytes());
        let result = self.collection.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }
}
