//! Storage interface and typed collection wrapper
//!
//! Handlers never talk to a driver directly. They go through a
//! [`Collection`], which encodes records with bson and forwards to whatever
//! [`DocumentStore`] the server was started with.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::types::{HearthError, Result};

/// Document database operations the service relies on.
///
/// Update documents use the MongoDB operator syntax (`$inc`, `$set`,
/// `$setOnInsert`, `$push`, `$pull`, `$addToSet`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for health and status output
    fn backend(&self) -> &'static str;

    /// Insert a single document
    async fn insert_one(&self, collection: &str, document: Document) -> Result<()>;

    /// Find every document matching `filter`, optionally sorted
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>>;

    /// Find the first document matching `filter`
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Find a document by its `_id`
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.find_one(collection, doc! { "_id": id }).await
    }

    /// Apply `update` to the first match and return the document as it is
    /// after the update. With `upsert`, a missing document is created from
    /// the filter's equality fields first.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<Document>>;
}

/// Generate a new record id (ObjectId hex text)
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

/// A record type stored in its own collection
pub trait Schema: Serialize + DeserializeOwned + Send + Sync + Unpin {
    /// Collection name
    const COLLECTION: &'static str;
}

/// Typed view over one collection of a [`DocumentStore`]
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Schema> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    pub async fn insert(&self, item: &T) -> Result<()> {
        let document = bson::to_document(item)?;
        self.store.insert_one(T::COLLECTION, document).await
    }

    pub async fn find(&self, filter: Document) -> Result<Vec<T>> {
        self.find_sorted(filter, None).await
    }

    pub async fn find_sorted(&self, filter: Document, sort: Option<Document>) -> Result<Vec<T>> {
        self.store
            .find(T::COLLECTION, filter, sort)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Update an existing record; `None` when nothing matched
    pub async fn update_one(&self, filter: Document, update: Document) -> Result<Option<T>> {
        self.store
            .update_one(T::COLLECTION, filter, update, false)
            .await?
            .map(decode)
            .transpose()
    }

    /// Update or insert. A fresh `_id` is supplied through `$setOnInsert`
    /// so created records carry the same id format as inserted ones.
    pub async fn upsert(&self, filter: Document, mut update: Document) -> Result<T> {
        match update.get_document_mut("$setOnInsert") {
            Ok(fields) => {
                if !fields.contains_key("_id") {
                    fields.insert("_id", new_id());
                }
            }
            Err(_) => {
                update.insert("$setOnInsert", doc! { "_id": new_id() });
            }
        }

        let document = self
            .store
            .update_one(T::COLLECTION, filter, update, true)
            .await?
            .ok_or_else(|| {
                HearthError::Database(format!("Upsert into {} returned no document", T::COLLECTION))
            })?;

        decode(document)
    }
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(bson::from_document(document)?)
}
