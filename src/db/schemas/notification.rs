//! Notification document schema

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{require, timestamp};
use crate::db::store::{new_id, Schema};
use crate::types::Result;

/// Collection name for notifications
pub const NOTIFICATION_COLLECTION: &str = "notifications";

/// Inbox entry for a user
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotificationDoc {
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,

    /// Free-form category, e.g. "friend_request"
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Once set, never cleared
    #[serde(default)]
    pub read: bool,
}

/// Client payload for a notification
#[derive(Deserialize, Clone, Debug)]
pub struct NewNotification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl NewNotification {
    pub fn validate(&self) -> Result<()> {
        require(&[
            ("user_id", &self.user_id),
            ("type", &self.kind),
            ("message", &self.message),
        ])
    }
}

impl From<NewNotification> for NotificationDoc {
    fn from(notification: NewNotification) -> Self {
        Self {
            id: new_id(),
            user_id: notification.user_id,
            kind: notification.kind,
            message: notification.message,
            created_at: timestamp::now(),
            read: false,
        }
    }
}

impl Schema for NotificationDoc {
    const COLLECTION: &'static str = NOTIFICATION_COLLECTION;
}

impl IntoIndexes for NotificationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "created_at": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_created_index".to_string())
                    .build(),
            ),
        )]
    }
}
