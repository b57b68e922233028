//! Achievement document schema
//!
//! Reference data: what an achievement is called, the conditions for earning
//! it, and the badge a user receives.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::require;
use crate::db::store::{new_id, Schema};
use crate::types::{HearthError, Result};

/// Collection name for achievements
pub const ACHIEVEMENT_COLLECTION: &str = "achievements";

/// What unlocking an achievement grants
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reward {
    /// Badge stored in the user's achievement list
    pub badge: String,

    #[serde(default)]
    pub points: i64,
}

/// Achievement document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AchievementDoc {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Opaque description of the unlock conditions
    pub criteria: serde_json::Value,

    pub reward: Reward,
}

/// Client payload for a new achievement definition
#[derive(Deserialize, Clone, Debug)]
pub struct NewAchievement {
    pub name: String,
    pub criteria: serde_json::Value,
    pub reward: Reward,
}

impl NewAchievement {
    pub fn validate(&self) -> Result<()> {
        require(&[("name", &self.name), ("reward.badge", &self.reward.badge)])?;
        if !self.criteria.is_object() {
            return Err(HearthError::BadRequest("`criteria` must be an object".into()));
        }
        Ok(())
    }
}

impl From<NewAchievement> for AchievementDoc {
    fn from(achievement: NewAchievement) -> Self {
        Self {
            id: new_id(),
            name: achievement.name,
            criteria: achievement.criteria,
            reward: achievement.reward,
        }
    }
}

impl Schema for AchievementDoc {
    const COLLECTION: &'static str = ACHIEVEMENT_COLLECTION;
}

impl IntoIndexes for AchievementDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_criteria_must_be_object() {
        let achievement: NewAchievement = serde_json::from_value(json!({
            "name": "Explorer",
            "criteria": "visit places",
            "reward": { "badge": "explorer-badge" }
        }))
        .unwrap();
        assert!(achievement.validate().is_err());
    }

    #[test]
    fn test_bson_round_trip_keeps_criteria() {
        let doc = AchievementDoc::from(NewAchievement {
            name: "Explorer".into(),
            criteria: json!({ "checkIns": 10, "distinct": true }),
            reward: Reward {
                badge: "explorer-badge".into(),
                points: 50,
            },
        });
        let encoded = bson::to_document(&doc).unwrap();
        let decoded: AchievementDoc = bson::from_document(encoded).unwrap();
        assert_eq!(decoded.criteria["checkIns"], 10);
        assert_eq!(decoded.reward.points, 50);
    }
}
