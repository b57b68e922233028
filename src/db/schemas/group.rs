//! Group document schema
//!
//! `members` is the source of truth for membership; the `groups` list on a
//! user's progress record is a mirror of it.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{require, timestamp};
use crate::db::store::{new_id, Schema};
use crate::types::Result;

/// Collection name for groups
pub const GROUP_COLLECTION: &str = "groups";

/// Group document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupDoc {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Member user IDs, without duplicates
    #[serde(default)]
    pub members: Vec<String>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Client payload for a new group
#[derive(Deserialize, Clone, Debug)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<()> {
        require(&[("name", &self.name)])?;
        for member in &self.members {
            require(&[("members[]", member)])?;
        }
        Ok(())
    }
}

impl From<NewGroup> for GroupDoc {
    fn from(group: NewGroup) -> Self {
        let mut members: Vec<String> = Vec::with_capacity(group.members.len());
        for member in group.members {
            if !members.contains(&member) {
                members.push(member);
            }
        }

        Self {
            id: new_id(),
            name: group.name,
            description: group.description,
            members,
            created_at: timestamp::now(),
        }
    }
}

impl Schema for GroupDoc {
    const COLLECTION: &'static str = GROUP_COLLECTION;
}

impl IntoIndexes for GroupDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "members": 1 },
            Some(
                IndexOptions::builder()
                    .name("members_index".to_string())
                    .build(),
            ),
        )]
    }
}
