//! Challenge document schema
//!
//! Shared goals that several users join and push forward together.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::require;
use crate::db::store::{new_id, Schema};
use crate::types::{HearthError, Result};

/// Collection name for challenges
pub const CHALLENGE_COLLECTION: &str = "challenges";

/// Challenge document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChallengeDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "challengeID")]
    pub challenge_id: String,

    pub description: String,

    #[serde(default)]
    pub participants: Vec<String>,

    #[serde(default)]
    pub progress: i64,

    pub goal: i64,

    pub reward: String,
}

impl ChallengeDoc {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.goal
    }
}

/// Client payload for a new challenge
#[derive(Deserialize, Clone, Debug)]
pub struct NewChallenge {
    #[serde(rename = "challengeID")]
    pub challenge_id: String,
    pub description: String,
    pub goal: i64,
    pub reward: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl NewChallenge {
    pub fn validate(&self) -> Result<()> {
        require(&[
            ("challengeID", &self.challenge_id),
            ("description", &self.description),
            ("reward", &self.reward),
        ])?;
        if self.goal <= 0 {
            return Err(HearthError::BadRequest("`goal` must be positive".into()));
        }
        Ok(())
    }
}

impl From<NewChallenge> for ChallengeDoc {
    fn from(challenge: NewChallenge) -> Self {
        let mut participants: Vec<String> = Vec::new();
        for participant in challenge.participants {
            if !participants.contains(&participant) {
                participants.push(participant);
            }
        }

        Self {
            id: new_id(),
            challenge_id: challenge.challenge_id,
            description: challenge.description,
            participants,
            progress: 0,
            goal: challenge.goal,
            reward: challenge.reward,
        }
    }
}

impl Schema for ChallengeDoc {
    const COLLECTION: &'static str = CHALLENGE_COLLECTION;
}

impl IntoIndexes for ChallengeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "challengeID": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("challenge_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}
