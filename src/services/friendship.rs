//! Friendships
//!
//! Trust/bond friends (`friends`) and scored friendships (`friendships`)
//! are separate models with separate endpoints.

use bson::doc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{
    clamp_trust, ordered_pair, require, timestamp, FriendsDoc, FriendshipDoc,
};
use crate::db::{Collection, DocumentStore};
use crate::types::{HearthError, Result};

/// Compare-and-set rounds before a trust update gives up
const TRUST_UPDATE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct FriendshipService {
    friends: Collection<FriendsDoc>,
    friendships: Collection<FriendshipDoc>,
}

impl FriendshipService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            friends: Collection::new(Arc::clone(&store)),
            friendships: Collection::new(store),
        }
    }

    pub async fn create_friends(
        &self,
        user_id: &str,
        friend_id: &str,
        element: Option<String>,
        aura_color: Option<String>,
    ) -> Result<FriendsDoc> {
        require(&[("userID", user_id), ("friendID", friend_id)])?;
        if user_id == friend_id {
            return Err(HearthError::BadRequest(
                "A user cannot befriend themselves".into(),
            ));
        }
        if self.find_friends(user_id, friend_id).await?.is_some() {
            return Err(HearthError::Conflict("Friendship already exists".into()));
        }

        let mut friends = FriendsDoc::new(user_id.to_string(), friend_id.to_string());
        if let Some(element) = element.filter(|e| !e.trim().is_empty()) {
            friends.friendship_element = element;
        }
        if let Some(color) = aura_color.filter(|c| !c.trim().is_empty()) {
            friends.aura_color = color;
        }

        self.friends.insert(&friends).await?;
        info!(user_id, friend_id, "Friendship created");
        Ok(friends)
    }

    pub async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendsDoc>> {
        self.friends
            .find_sorted(doc! { "userID": user_id }, Some(doc! { "friendID": 1 }))
            .await
    }

    /// Raise (or lower) trust, capped at the maximum. Returns the new level.
    ///
    /// The write only lands if the level is still the one it was computed
    /// from; a concurrent change makes it re-read and try again.
    pub async fn update_trust(&self, user_id: &str, friend_id: &str, amount: i64) -> Result<i64> {
        require(&[("userID", user_id), ("friendID", friend_id)])?;

        for _ in 0..TRUST_UPDATE_ATTEMPTS {
            let friends = self
                .find_friends(user_id, friend_id)
                .await?
                .ok_or_else(|| HearthError::NotFound("Friendship not found".into()))?;

            let trust_level = clamp_trust(friends.trust_level, amount);
            let updated = self
                .friends
                .update_one(
                    doc! { "_id": &friends.id, "trustLevel": friends.trust_level },
                    doc! { "$set": { "trustLevel": trust_level } },
                )
                .await?;

            if let Some(updated) = updated {
                debug!(
                    user_id,
                    friend_id,
                    from = friends.trust_level,
                    to = updated.trust_level,
                    "Trust updated"
                );
                return Ok(updated.trust_level);
            }
            debug!(user_id, friend_id, "Trust changed concurrently, retrying");
        }

        Err(HearthError::Conflict(
            "Trust level is being updated concurrently".into(),
        ))
    }

    /// Bump the score of an unordered pair, creating the record on first use
    pub async fn record_interaction(
        &self,
        user_a: &str,
        user_b: &str,
        amount: i64,
    ) -> Result<FriendshipDoc> {
        require(&[("userA", user_a), ("userB", user_b)])?;
        if user_a == user_b {
            return Err(HearthError::BadRequest(
                "A friendship needs two different users".into(),
            ));
        }

        let (first, second) = ordered_pair(user_a, user_b);
        let friendship = self
            .friendships
            .upsert(
                doc! { "userA": first, "userB": second },
                doc! {
                    "$inc": { "score": amount },
                    "$set": { "lastInteraction": timestamp::now_bson() },
                },
            )
            .await?;

        debug!(
            user_a = first,
            user_b = second,
            score = friendship.score,
            "Friendship updated"
        );
        Ok(friendship)
    }

    async fn find_friends(&self, user_id: &str, friend_id: &str) -> Result<Option<FriendsDoc>> {
        self.friends
            .find_one(doc! { "userID": user_id, "friendID": friend_id })
            .await
    }
}
