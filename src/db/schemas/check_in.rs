//! Check-in document schema

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{require, timestamp};
use crate::db::store::{new_id, Schema};
use crate::types::Result;

/// Collection name for check-ins
pub const CHECK_IN_COLLECTION: &str = "checkins";

/// A visit to a location, optionally with companions
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "userID")]
    pub user_id: String,

    pub location: String,

    /// User IDs of the people present
    #[serde(default)]
    pub companions: Vec<String>,

    #[serde(default)]
    pub social_points: i64,

    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Client payload for a check-in
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckIn {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub location: String,
    #[serde(default)]
    pub companions: Vec<String>,
    #[serde(default)]
    pub social_points: i64,
}

impl NewCheckIn {
    pub fn validate(&self) -> Result<()> {
        require(&[("userID", &self.user_id), ("location", &self.location)])
    }
}

impl From<NewCheckIn> for CheckInDoc {
    fn from(check_in: NewCheckIn) -> Self {
        Self {
            id: new_id(),
            user_id: check_in.user_id,
            location: check_in.location,
            companions: check_in.companions,
            social_points: check_in.social_points,
            timestamp: timestamp::now(),
        }
    }
}

impl Schema for CheckInDoc {
    const COLLECTION: &'static str = CHECK_IN_COLLECTION;
}

impl IntoIndexes for CheckInDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userID": 1, "timestamp": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_timestamp_index".to_string())
                    .build(),
            ),
        )]
    }
}
