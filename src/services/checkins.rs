//! Check-ins and social points
//!
//! A check-in is append-only. When it awards points, the user's running
//! total is bumped in the `users` collection, creating the user on demand.

use bson::doc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{require, CheckInDoc, NewCheckIn, UserDoc};
use crate::db::{Collection, DocumentStore};
use crate::types::{HearthError, Result};

#[derive(Clone)]
pub struct CheckInService {
    check_ins: Collection<CheckInDoc>,
    users: Collection<UserDoc>,
}

impl CheckInService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            check_ins: Collection::new(Arc::clone(&store)),
            users: Collection::new(store),
        }
    }

    /// Record a check-in and credit its points
    pub async fn record(&self, check_in: NewCheckIn) -> Result<CheckInDoc> {
        check_in.validate()?;
        let check_in = CheckInDoc::from(check_in);
        self.check_ins.insert(&check_in).await?;

        if check_in.social_points != 0 {
            self.get_or_create_user(&check_in.user_id).await?;
            let user = self
                .users
                .update_one(
                    doc! { "userID": &check_in.user_id },
                    doc! { "$inc": { "totalSocialPoints": check_in.social_points } },
                )
                .await?
                .ok_or_else(|| HearthError::NotFound("User not found".into()))?;

            debug!(
                user_id = %user.user_id,
                total = user.total_social_points,
                "Social points credited"
            );
        }

        info!(
            user_id = %check_in.user_id,
            location = %check_in.location,
            points = check_in.social_points,
            "Check-in recorded"
        );
        Ok(check_in)
    }

    /// Check-ins of a user, oldest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<CheckInDoc>> {
        let check_ins = self
            .check_ins
            .find_sorted(doc! { "userID": user_id }, Some(doc! { "timestamp": 1 }))
            .await?;

        if check_ins.is_empty() {
            return Err(HearthError::NotFound(
                "No check-ins found for this user".into(),
            ));
        }
        Ok(check_ins)
    }

    pub async fn social_points(&self, user_id: &str) -> Result<i64> {
        self.users
            .find_one(doc! { "userID": user_id })
            .await?
            .map(|user| user.total_social_points)
            .ok_or_else(|| HearthError::NotFound("User not found".into()))
    }

    /// Fetch the user, creating it with zero points when absent
    pub async fn get_or_create_user(&self, user_id: &str) -> Result<UserDoc> {
        self.users
            .upsert(
                doc! { "userID": user_id },
                doc! { "$setOnInsert": UserDoc::insert_defaults() },
            )
            .await
    }

    /// Set the display name, creating the user when absent
    pub async fn set_name(&self, user_id: &str, name: &str) -> Result<UserDoc> {
        require(&[("userID", user_id), ("name", name)])?;
        self.get_or_create_user(user_id).await?;

        self.users
            .update_one(
                doc! { "userID": user_id },
                doc! { "$set": { "name": name.trim() } },
            )
            .await?
            .ok_or_else(|| HearthError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn check_in(user_id: &str, location: &str, points: i64) -> NewCheckIn {
        NewCheckIn {
            user_id: user_id.into(),
            location: location.into(),
            companions: vec![],
            social_points: points,
        }
    }

    #[tokio::test]
    async fn test_points_accumulate_across_check_ins() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        service.record(check_in("u1", "Park", 10)).await.unwrap();
        service.record(check_in("u1", "Cafe", 5)).await.unwrap();

        assert_eq!(service.social_points("u1").await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_zero_points_creates_no_user() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        service.record(check_in("u2", "Park", 0)).await.unwrap();

        let err = service.social_points("u2").await.unwrap_err();
        assert_eq!(err.public_message(), "User not found");
        assert_eq!(service.list_for_user("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_unknown_user_is_not_found() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        let err = service.list_for_user("nobody").await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_is_oldest_first() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        service.record(check_in("u1", "First", 1)).await.unwrap();
        service.record(check_in("u1", "Second", 1)).await.unwrap();

        let locations: Vec<String> = service
            .list_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.location)
            .collect();
        assert_eq!(locations, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_set_name_keeps_points() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        service.record(check_in("u1", "Park", 7)).await.unwrap();

        let user = service.set_name("u1", "Ada").await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.total_social_points, 7);
    }

    #[tokio::test]
    async fn test_points_overflow_is_an_error() {
        let service = CheckInService::new(Arc::new(MemoryStore::new()));
        service.record(check_in("u1", "Park", i64::MAX)).await.unwrap();

        let err = service
            .record(check_in("u1", "Park", i64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, HearthError::Database(_)));
        assert_eq!(service.social_points("u1").await.unwrap(), i64::MAX);
    }
}
