//! User progress: achievements, goals, favorites and the group mirror
//!
//! Every write that may target a user without a record first goes through
//! [`ProgressService::get_or_create`], an upsert touching only
//! `$setOnInsert`. The actual change is a separate update, so the defaults
//! never collide with `$push`/`$inc` on the same fields.

use bson::{doc, Bson, Document};
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{
    require, timestamp, AchievementDoc, Favorite, Goal, NewAchievement, UserProgressDoc,
};
use crate::db::{Collection, DocumentStore};
use crate::types::{HearthError, Result};

#[derive(Clone)]
pub struct ProgressService {
    progress: Collection<UserProgressDoc>,
    achievements: Collection<AchievementDoc>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            progress: Collection::new(Arc::clone(&store)),
            achievements: Collection::new(store),
        }
    }

    /// Fetch the progress record, creating an empty one when absent
    pub async fn get_or_create(&self, user_id: &str) -> Result<UserProgressDoc> {
        require(&[("userID", user_id)])?;
        self.progress
            .upsert(
                doc! { "userID": user_id },
                doc! { "$setOnInsert": UserProgressDoc::insert_defaults() },
            )
            .await
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<UserProgressDoc>> {
        self.progress.find_one(doc! { "userID": user_id }).await
    }

    pub async fn get(&self, user_id: &str) -> Result<UserProgressDoc> {
        self.find(user_id).await?.ok_or_else(user_not_found)
    }

    /// Get-or-create, then apply `update`
    async fn update_or_create(&self, user_id: &str, update: Document) -> Result<UserProgressDoc> {
        self.get_or_create(user_id).await?;
        self.progress
            .update_one(doc! { "userID": user_id }, update)
            .await?
            .ok_or_else(user_not_found)
    }

    // ------------------------------------------------------------------------
    // Achievements
    // ------------------------------------------------------------------------

    pub async fn achievements(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self.get(user_id).await?.achievements)
    }

    /// Define a reference achievement; names are unique
    pub async fn define_achievement(&self, achievement: NewAchievement) -> Result<AchievementDoc> {
        achievement.validate()?;
        if self
            .achievements
            .find_one(doc! { "name": &achievement.name })
            .await?
            .is_some()
        {
            return Err(HearthError::Conflict(format!(
                "Achievement '{}' already exists",
                achievement.name
            )));
        }

        let achievement = AchievementDoc::from(achievement);
        self.achievements.insert(&achievement).await?;
        info!(name = %achievement.name, "Achievement defined");
        Ok(achievement)
    }

    pub async fn list_achievements(&self) -> Result<Vec<AchievementDoc>> {
        self.achievements
            .find_sorted(doc! {}, Some(doc! { "name": 1 }))
            .await
    }

    /// Look up a reference achievement and append its badge
    pub async fn grant_achievement(
        &self,
        user_id: &str,
        achievement_name: &str,
    ) -> Result<Vec<String>> {
        require(&[("userID", user_id), ("achievementName", achievement_name)])?;
        let achievement = self
            .achievements
            .find_one(doc! { "name": achievement_name })
            .await?
            .ok_or_else(|| HearthError::NotFound("Achievement not found".into()))?;

        let record = self
            .update_or_create(
                user_id,
                doc! { "$push": { "achievements": &achievement.reward.badge } },
            )
            .await?;

        info!(user_id, badge = %achievement.reward.badge, "Achievement granted");
        Ok(record.achievements)
    }

    /// Add an achievement name without a lookup; repeats are ignored
    pub async fn unlock_achievement(
        &self,
        user_id: &str,
        achievement_name: &str,
    ) -> Result<Vec<String>> {
        require(&[("userID", user_id), ("achievementName", achievement_name)])?;
        let record = self
            .update_or_create(
                user_id,
                doc! { "$addToSet": { "achievements": achievement_name } },
            )
            .await?;

        info!(user_id, achievement_name, "Achievement unlocked");
        Ok(record.achievements)
    }

    // ------------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------------

    pub async fn add_goal(&self, user_id: &str, goal_name: &str, target: i64) -> Result<Vec<Goal>> {
        require(&[("userID", user_id), ("goalName", goal_name)])?;
        if target <= 0 {
            return Err(HearthError::BadRequest("`target` must be positive".into()));
        }

        let goal = Goal {
            name: goal_name.to_string(),
            progress: 0,
            target,
        };
        let record = self
            .update_or_create(
                user_id,
                doc! { "$push": { "currentGoals": bson::to_bson(&goal)? } },
            )
            .await?;

        debug!(user_id, goal_name, goal_target = target, "Goal added");
        Ok(record.current_goals)
    }

    /// Advance a goal. A goal that reaches its target is removed and counted
    /// once in `dailyGoalsCompleted`; an unknown goal leaves the record as is.
    ///
    /// The increment is applied in place on the matched element, and the
    /// completion decision is taken from the record the increment returns.
    pub async fn update_goal_progress(
        &self,
        user_id: &str,
        goal_name: &str,
        increment: i64,
    ) -> Result<UserProgressDoc> {
        let has_goal = doc! { "userID": user_id, "currentGoals.name": goal_name };

        let Some(advanced) = self
            .progress
            .update_one(
                has_goal.clone(),
                doc! { "$inc": { "currentGoals.$.progress": increment } },
            )
            .await?
        else {
            debug!(user_id, goal_name, "No such goal, progress ignored");
            return self.get(user_id).await;
        };

        if !advanced.goal(goal_name).map_or(false, Goal::is_complete) {
            return Ok(advanced);
        }

        // The goal must still be present, so a concurrent completion is
        // never counted twice
        let completion = doc! {
            "$inc": { "socialGoals.dailyGoalsCompleted": 1_i64 },
            "$pull": { "currentGoals": { "name": goal_name } },
        };
        match self.progress.update_one(has_goal, completion).await? {
            Some(updated) => {
                info!(user_id, goal_name, "Goal completed");
                Ok(updated)
            }
            None => self.get(user_id).await,
        }
    }

    // ------------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------------

    pub async fn add_favorite(
        &self,
        user_id: &str,
        title: Option<String>,
        url: &str,
    ) -> Result<Vec<Favorite>> {
        require(&[("userID", user_id), ("url", url)])?;
        let favorite = Favorite {
            title: title.filter(|title| !title.trim().is_empty()),
            url: url.to_string(),
            added_at: timestamp::now(),
        };

        let record = self
            .update_or_create(
                user_id,
                doc! { "$push": { "favorites": bson::to_bson(&favorite)? } },
            )
            .await?;
        Ok(record.favorites)
    }

    pub async fn favorites(&self, user_id: &str) -> Result<Vec<Favorite>> {
        Ok(self.get(user_id).await?.favorites)
    }

    // ------------------------------------------------------------------------
    // Group mirror
    // ------------------------------------------------------------------------

    pub async fn link_group(&self, user_id: &str, group_id: &str) -> Result<UserProgressDoc> {
        self.update_or_create(user_id, doc! { "$addToSet": { "groups": group_id } })
            .await
    }

    /// Drop a group id from the mirror; users without a record are skipped
    pub async fn unlink_group(&self, user_id: &str, group_id: &str) -> Result<()> {
        self.progress
            .update_one(
                doc! { "userID": user_id },
                doc! { "$pull": { "groups": group_id } },
            )
            .await?;
        Ok(())
    }

    /// Overwrite the mirror with the authoritative membership
    pub async fn set_groups(&self, user_id: &str, group_ids: &[String]) -> Result<UserProgressDoc> {
        let ids: Vec<Bson> = group_ids.iter().cloned().map(Bson::String).collect();
        self.update_or_create(user_id, doc! { "$set": { "groups": ids } })
            .await
    }
}

fn user_not_found() -> HearthError {
    HearthError::NotFound("User not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::interleave::InterleavedWrite;
    use crate::db::schemas::{Reward, PROGRESS_COLLECTION};
    use crate::db::MemoryStore;
    use serde_json::json;

    fn service() -> ProgressService {
        ProgressService::new(Arc::new(MemoryStore::new()))
    }

    fn social_butterfly() -> NewAchievement {
        NewAchievement {
            name: "Social Butterfly".into(),
            criteria: json!({ "checkIns": 10 }),
            reward: Reward {
                badge: "butterfly".into(),
                points: 50,
            },
        }
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let service = service();
        let first = service.get_or_create("u1").await.unwrap();
        let second = service.get_or_create("u1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.achievements.is_empty());
        assert_eq!(first.social_goals.daily_goals_completed, 0);
    }

    #[tokio::test]
    async fn test_goal_completes_exactly_once() {
        let service = service();
        service.add_goal("u1", "Walk5k", 5).await.unwrap();

        let after_first = service.update_goal_progress("u1", "Walk5k", 3).await.unwrap();
        assert_eq!(after_first.goal("Walk5k").map(|g| g.progress), Some(3));
        assert_eq!(after_first.social_goals.daily_goals_completed, 0);

        let after_second = service.update_goal_progress("u1", "Walk5k", 3).await.unwrap();
        assert!(after_second.goal("Walk5k").is_none());
        assert_eq!(after_second.social_goals.daily_goals_completed, 1);

        let after_third = service.update_goal_progress("u1", "Walk5k", 3).await.unwrap();
        assert_eq!(after_third.social_goals.daily_goals_completed, 1);
    }

    #[tokio::test]
    async fn test_progress_keeps_goal_added_concurrently() {
        let store = Arc::new(InterleavedWrite::default());
        let service = ProgressService::new(store.clone());
        service.add_goal("u1", "Walk5k", 5).await.unwrap();

        let read = Goal {
            name: "Read".into(),
            progress: 0,
            target: 3,
        };
        store.queue(
            PROGRESS_COLLECTION,
            doc! { "userID": "u1" },
            doc! { "$push": { "currentGoals": bson::to_bson(&read).unwrap() } },
        );

        let record = service.update_goal_progress("u1", "Walk5k", 1).await.unwrap();
        let names: Vec<&str> = record.current_goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Walk5k", "Read"]);
        assert_eq!(record.goal("Walk5k").map(|g| g.progress), Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_increments_complete_the_goal() {
        let store = Arc::new(InterleavedWrite::default());
        let service = ProgressService::new(store.clone());
        service.add_goal("u1", "Walk5k", 5).await.unwrap();

        store.queue(
            PROGRESS_COLLECTION,
            doc! { "userID": "u1", "currentGoals.name": "Walk5k" },
            doc! { "$inc": { "currentGoals.$.progress": 3_i64 } },
        );

        let record = service.update_goal_progress("u1", "Walk5k", 3).await.unwrap();
        assert!(record.goal("Walk5k").is_none());
        assert_eq!(record.social_goals.daily_goals_completed, 1);
    }

    #[tokio::test]
    async fn test_unknown_goal_is_a_no_op() {
        let service = service();
        service.add_goal("u1", "Walk5k", 5).await.unwrap();

        let record = service.update_goal_progress("u1", "Swim", 10).await.unwrap();
        assert_eq!(record.current_goals.len(), 1);
        assert_eq!(record.current_goals[0].progress, 0);
    }

    #[tokio::test]
    async fn test_progress_without_record_is_not_found() {
        let err = service()
            .update_goal_progress("ghost", "Walk5k", 1)
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "User not found");
    }

    #[tokio::test]
    async fn test_add_goal_rejects_non_positive_target() {
        let err = service().add_goal("u1", "Walk5k", 0).await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_grant_appends_reward_badge() {
        let service = service();
        service.define_achievement(social_butterfly()).await.unwrap();

        let badges = service
            .grant_achievement("u1", "Social Butterfly")
            .await
            .unwrap();
        assert_eq!(badges, vec!["butterfly"]);
    }

    #[tokio::test]
    async fn test_grant_unknown_achievement() {
        let err = service().grant_achievement("u1", "Nope").await.unwrap_err();
        assert_eq!(err.public_message(), "Achievement not found");
    }

    #[tokio::test]
    async fn test_unlock_has_set_semantics() {
        let service = service();
        service.unlock_achievement("u1", "First Steps").await.unwrap();
        let names = service.unlock_achievement("u1", "First Steps").await.unwrap();
        assert_eq!(names, vec!["First Steps"]);
    }

    #[tokio::test]
    async fn test_duplicate_achievement_conflicts() {
        let service = service();
        service.define_achievement(social_butterfly()).await.unwrap();
        let err = service
            .define_achievement(social_butterfly())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_favorites() {
        let service = service();
        service
            .add_favorite("u1", Some("Trail map".into()), "https://example.com/map")
            .await
            .unwrap();
        let favorites = service.favorites("u1").await.unwrap();

        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title.as_deref(), Some("Trail map"));

        let err = service.add_favorite("u1", None, " ").await.unwrap_err();
        assert_eq!(err.public_message(), "`url` is required");
    }

    #[tokio::test]
    async fn test_group_mirror() {
        let service = service();
        service.link_group("u1", "g1").await.unwrap();
        service.link_group("u1", "g1").await.unwrap();
        assert_eq!(service.get("u1").await.unwrap().groups, vec!["g1"]);

        service.unlink_group("u1", "g1").await.unwrap();
        assert!(service.get("u1").await.unwrap().groups.is_empty());

        // No record is created just to remove from it
        service.unlink_group("u2", "g1").await.unwrap();
        assert!(service.find("u2").await.unwrap().is_none());
    }
}
