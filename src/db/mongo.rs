//! MongoDB backend for [`DocumentStore`]

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{IndexOptions, ReturnDocument},
    Client, IndexModel,
};
use tracing::{debug, info};

use crate::db::store::{DocumentStore, Schema};
use crate::types::{HearthError, Result};

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db_name: String,
}

impl MongoStore {
    /// Connect and verify the connection with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB");

        // Fail fast on an unreachable server instead of hanging at startup
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| HearthError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| HearthError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Create the indexes a schema declares
    pub async fn apply_indexes<T: Schema + IntoIndexes>(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.collection(T::COLLECTION)
            .create_indexes(indices)
            .await
            .map_err(|e| {
                HearthError::Database(format!(
                    "Failed to create indexes on {}: {}",
                    T::COLLECTION,
                    e
                ))
            })?;

        debug!("Indexes ready on {}", T::COLLECTION);
        Ok(())
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.client.database(&self.db_name).collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| HearthError::Database(format!("Insert into {} failed: {}", collection, e)))?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter);
        if let Some(sort) = sort {
            action = action.sort(sort);
        }

        let cursor = action
            .await
            .map_err(|e| HearthError::Database(format!("Find in {} failed: {}", collection, e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| HearthError::Database(format!("Reading {} failed: {}", collection, e)))
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(filter)
            .await
            .map_err(|e| HearthError::Database(format!("Find in {} failed: {}", collection, e)))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one_and_update(filter, update)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| HearthError::Database(format!("Update in {} failed: {}", collection, e)))
    }
}

