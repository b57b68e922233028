//! Test store that lands another writer's update between a service's read
//! and its write

use async_trait::async_trait;
use bson::Document;
use std::sync::Mutex;

use crate::db::{DocumentStore, MemoryStore};
use crate::types::Result;

/// Wraps a [`MemoryStore`]; a queued update is applied just before the
/// next `update_one` reaches it
#[derive(Default)]
pub struct InterleavedWrite {
    inner: MemoryStore,
    queued: Mutex<Option<(String, Document, Document)>>,
}

impl InterleavedWrite {
    pub fn queue(&self, collection: &str, filter: Document, update: Document) {
        *self.queued.lock().unwrap() = Some((collection.to_string(), filter, update));
    }
}

#[async_trait]
impl DocumentStore for InterleavedWrite {
    fn backend(&self) -> &'static str {
        "interleaved"
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<()> {
        self.inner.insert_one(collection, document).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>> {
        self.inner.find(collection, filter, sort).await
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.inner.find_one(collection, filter).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<Document>> {
        let queued = self.queued.lock().unwrap().take();
        if let Some((other, other_filter, other_update)) = queued {
            self.inner
                .update_one(&other, other_filter, other_update, false)
                .await?;
        }
        self.inner.update_one(collection, filter, update, upsert).await
    }
}
