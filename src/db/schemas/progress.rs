//! User progress document schema
//!
//! One record per user: earned badges, goal counters, active goals,
//! favorites and a mirror of the user's group memberships.

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::timestamp;
use crate::db::store::Schema;

/// Collection name for user progress
pub const PROGRESS_COLLECTION: &str = "userprogress";

/// Completed goal counters
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SocialGoals {
    #[serde(default)]
    pub daily_goals_completed: i64,
    #[serde(default)]
    pub weekly_goals_completed: i64,
}

/// A goal the user is working towards
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    pub name: String,
    #[serde(default)]
    pub progress: i64,
    pub target: i64,
}

impl Goal {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }
}

/// A saved link
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(with = "timestamp")]
    pub added_at: DateTime<Utc>,
}

/// User progress document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "userID")]
    pub user_id: String,

    /// Earned badges or unlocked achievement names
    #[serde(default)]
    pub achievements: Vec<String>,

    #[serde(default)]
    pub social_goals: SocialGoals,

    #[serde(default)]
    pub current_goals: Vec<Goal>,

    #[serde(default)]
    pub favorites: Vec<Favorite>,

    /// Group ids, mirrored from group membership
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserProgressDoc {
    /// Fields written only when the record is first created
    pub fn insert_defaults() -> Document {
        doc! {
            "achievements": Bson::Array(Vec::new()),
            "socialGoals": {
                "dailyGoalsCompleted": Bson::Int64(0),
                "weeklyGoalsCompleted": Bson::Int64(0),
            },
            "currentGoals": Bson::Array(Vec::new()),
            "favorites": Bson::Array(Vec::new()),
            "groups": Bson::Array(Vec::new()),
        }
    }

    pub fn goal(&self, name: &str) -> Option<&Goal> {
        self.current_goals.iter().find(|goal| goal.name == name)
    }
}

impl Schema for UserProgressDoc {
    const COLLECTION: &'static str = PROGRESS_COLLECTION;
}

impl IntoIndexes for UserProgressDoc {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_record_decodes_with_defaults() {
        let decoded: UserProgressDoc =
            bson::from_document(doc! { "_id": "p1", "userID": "u1" }).unwrap();
        assert!(decoded.achievements.is_empty());
        assert_eq!(decoded.social_goals, SocialGoals::default());
        assert!(decoded.current_goals.is_empty());
    }

    #[test]
    fn test_goal_completion() {
        let mut goal = Goal {
            name: "Walk5k".into(),
            progress: 3,
            target: 5,
        };
        assert!(!goal.is_complete());
        goal.progress = 6;
        assert!(goal.is_complete());
    }
}
