//! Challenges: shared goals that several users push forward together

use bson::doc;
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{require, ChallengeDoc, NewChallenge};
use crate::db::{Collection, DocumentStore};
use crate::types::{HearthError, Result};

#[derive(Clone)]
pub struct ChallengeService {
    challenges: Collection<ChallengeDoc>,
}

impl ChallengeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            challenges: Collection::new(store),
        }
    }

    pub async fn create(&self, challenge: NewChallenge) -> Result<ChallengeDoc> {
        challenge.validate()?;
        if self
            .challenges
            .find_one(doc! { "challengeID": &challenge.challenge_id })
            .await?
            .is_some()
        {
            return Err(HearthError::Conflict(format!(
                "Challenge '{}' already exists",
                challenge.challenge_id
            )));
        }

        let challenge = ChallengeDoc::from(challenge);
        self.challenges.insert(&challenge).await?;
        info!(challenge_id = %challenge.challenge_id, goal = challenge.goal, "Challenge created");
        Ok(challenge)
    }

    pub async fn get(&self, challenge_id: &str) -> Result<ChallengeDoc> {
        self.challenges
            .find_one(doc! { "challengeID": challenge_id })
            .await?
            .ok_or_else(challenge_not_found)
    }

    pub async fn join(&self, challenge_id: &str, user_id: &str) -> Result<ChallengeDoc> {
        require(&[("challengeID", challenge_id), ("userID", user_id)])?;
        self.challenges
            .update_one(
                doc! { "challengeID": challenge_id },
                doc! { "$addToSet": { "participants": user_id } },
            )
            .await?
            .ok_or_else(challenge_not_found)
    }

    pub async fn record_progress(&self, challenge_id: &str, increment: i64) -> Result<ChallengeDoc> {
        require(&[("challengeID", challenge_id)])?;
        let challenge = self
            .challenges
            .update_one(
                doc! { "challengeID": challenge_id },
                doc! { "$inc": { "progress": increment } },
            )
            .await?
            .ok_or_else(challenge_not_found)?;

        if challenge.is_complete() {
            info!(challenge_id, progress = challenge.progress, "Challenge goal reached");
        }
        Ok(challenge)
    }
}

fn challenge_not_found() -> HearthError {
    HearthError::NotFound("Challenge not found".into())
}
