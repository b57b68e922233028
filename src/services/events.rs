//! Calendar events
//!
//! Visibility gates reads: public events are listed for everyone, private
//! events only for the usernames on their invite list.

use bson::doc;
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{EventDoc, NewEvent, Visibility};
use crate::db::{Collection, DocumentStore};
use crate::types::Result;

#[derive(Clone)]
pub struct EventService {
    events: Collection<EventDoc>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            events: Collection::new(store),
        }
    }

    pub async fn create(&self, event: NewEvent) -> Result<EventDoc> {
        event.validate()?;
        let event = EventDoc::from(event);
        self.events.insert(&event).await?;

        info!(
            event_id = %event.id,
            creator = %event.creator,
            visibility = event.visibility.as_str(),
            "Event created"
        );
        Ok(event)
    }

    /// Every event regardless of visibility
    pub async fn list_all(&self) -> Result<Vec<EventDoc>> {
        self.events.find_sorted(doc! {}, Some(by_time())).await
    }

    pub async fn list_public(&self) -> Result<Vec<EventDoc>> {
        self.events
            .find_sorted(
                doc! { "visibility": Visibility::Public.as_str() },
                Some(by_time()),
            )
            .await
    }

    /// Private events that list `username` as invited
    pub async fn list_invited(&self, username: &str) -> Result<Vec<EventDoc>> {
        self.events
            .find_sorted(
                doc! {
                    "visibility": Visibility::Private.as_str(),
                    "invited": username,
                },
                Some(by_time()),
            )
            .await
    }
}

fn by_time() -> bson::Document {
    doc! { "time": 1 }
}
