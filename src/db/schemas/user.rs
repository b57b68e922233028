//! User document schema
//!
//! Holds the running social points total. Records are created on demand by
//! the first check-in that awards points.

use bson::{doc, Bson, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::store::Schema;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "userID")]
    pub user_id: String,

    /// Display name, unset for users created implicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub total_social_points: i64,
}

impl UserDoc {
    /// Fields written only when the record is first created
    pub fn insert_defaults() -> Document {
        doc! { "totalSocialPoints": Bson::Int64(0) }
    }
}

impl Schema for UserDoc {
    const COLLECTION: &'static str = USER_COLLECTION;
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userID": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}
