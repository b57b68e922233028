//! Notification inbox

use bson::doc;
use std::sync::Arc;
use tracing::debug;

use crate::db::schemas::{NewNotification, NotificationDoc};
use crate::db::{Collection, DocumentStore};
use crate::types::{HearthError, Result};

#[derive(Clone)]
pub struct NotificationService {
    notifications: Collection<NotificationDoc>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            notifications: Collection::new(store),
        }
    }

    pub async fn create(&self, notification: NewNotification) -> Result<NotificationDoc> {
        notification.validate()?;
        let notification = NotificationDoc::from(notification);
        self.notifications.insert(&notification).await?;

        debug!(
            id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification created"
        );
        Ok(notification)
    }

    /// Oldest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationDoc>> {
        self.notifications
            .find_sorted(doc! { "user_id": user_id }, Some(doc! { "created_at": 1 }))
            .await
    }

    pub async fn mark_read(&self, id: &str) -> Result<NotificationDoc> {
        self.notifications
            .update_one(doc! { "_id": id }, doc! { "$set": { "read": true } })
            .await?
            .ok_or_else(|| HearthError::NotFound("Notification not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn friend_request(user_id: &str) -> NewNotification {
        NewNotification {
            user_id: user_id.into(),
            kind: "friend_request".into(),
            message: "Bob wants to be friends".into(),
        }
    }

    #[tokio::test]
    async fn test_created_unread_then_marked_read() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let created = service.create(friend_request("u1")).await.unwrap();
        assert!(!created.read);

        let read = service.mark_read(&created.id).await.unwrap();
        assert!(read.read);

        // Marking again leaves it read
        assert!(service.mark_read(&created.id).await.unwrap().read);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_id() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let err = service.mark_read("not-an-id").await.unwrap_err();
        assert_eq!(err.public_message(), "Notification not found");
    }

    #[tokio::test]
    async fn test_list_only_returns_own_notifications() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        service.create(friend_request("u1")).await.unwrap();
        service.create(friend_request("u1")).await.unwrap();
        service.create(friend_request("u2")).await.unwrap();

        assert_eq!(service.list_for_user("u1").await.unwrap().len(), 2);
        assert!(service.list_for_user("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let service = NotificationService::new(Arc::new(MemoryStore::new()));
        let mut notification = friend_request("u1");
        notification.message = " ".into();
        let err = service.create(notification).await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::BAD_REQUEST);
    }
}
