//! Event document schema
//!
//! Calendar entries. Public events are readable by anyone; private ones only
//! by the users on their invite list.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::require;
use crate::db::store::{new_id, Schema};
use crate::types::Result;

/// Collection name for events
pub const EVENT_COLLECTION: &str = "events";

/// Who can see an event
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Event document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventDoc {
    #[serde(rename = "_id")]
    pub id: String,

    /// Username of the creator
    pub creator: String,

    pub title: String,

    /// Start time as sent by the client; sorted lexically
    pub time: String,

    pub visibility: Visibility,

    /// Usernames allowed to see a private event
    #[serde(default)]
    pub invited: Vec<String>,
}

/// Client payload for a new event
#[derive(Deserialize, Clone, Debug)]
pub struct NewEvent {
    pub creator: String,
    pub title: String,
    pub time: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub invited: Vec<String>,
}

impl NewEvent {
    /// Reject blank required fields
    pub fn validate(&self) -> Result<()> {
        require(&[
            ("creator", &self.creator),
            ("title", &self.title),
            ("time", &self.time),
        ])
    }
}

impl From<NewEvent> for EventDoc {
    fn from(event: NewEvent) -> Self {
        Self {
            id: new_id(),
            creator: event.creator,
            title: event.title,
            time: event.time,
            visibility: event.visibility,
            invited: event.invited,
        }
    }
}

impl Schema for EventDoc {
    const COLLECTION: &'static str = EVENT_COLLECTION;
}

impl IntoIndexes for EventDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "visibility": 1, "time": 1 },
                Some(
                    IndexOptions::builder()
                        .name("visibility_time_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "invited": 1 },
                Some(
                    IndexOptions::builder()
                        .name("invited_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
