//! Groups
//!
//! `groups.members` is the source of truth for membership. Each member's
//! progress record carries a mirror of their group ids; mirror writes are
//! best-effort and [`GroupService::groups_for_user`] repairs drift.

use bson::doc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::schemas::{require, GroupDoc, NewGroup};
use crate::db::{Collection, DocumentStore};
use crate::services::ProgressService;
use crate::types::{HearthError, Result};

#[derive(Clone)]
pub struct GroupService {
    groups: Collection<GroupDoc>,
    progress: ProgressService,
}

impl GroupService {
    pub fn new(store: Arc<dyn DocumentStore>, progress: ProgressService) -> Self {
        Self {
            groups: Collection::new(store),
            progress,
        }
    }

    pub async fn create(&self, group: NewGroup) -> Result<GroupDoc> {
        group.validate()?;
        let group = GroupDoc::from(group);
        self.groups.insert(&group).await?;

        for member in &group.members {
            self.mirror_join(member, &group.id).await;
        }

        info!(
            group_id = %group.id,
            name = %group.name,
            members = group.members.len(),
            "Group created"
        );
        Ok(group)
    }

    pub async fn get(&self, group_id: &str) -> Result<GroupDoc> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(group_not_found)
    }

    /// Add a member; adding an existing member changes nothing
    pub async fn add_member(&self, group_id: &str, user_id: &str) -> Result<GroupDoc> {
        require(&[("groupID", group_id), ("userID", user_id)])?;
        let group = self
            .groups
            .update_one(
                doc! { "_id": group_id },
                doc! { "$addToSet": { "members": user_id } },
            )
            .await?
            .ok_or_else(group_not_found)?;

        self.mirror_join(user_id, group_id).await;
        info!(group_id, user_id, "Member added");
        Ok(group)
    }

    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<GroupDoc> {
        require(&[("groupID", group_id), ("userID", user_id)])?;
        let group = self
            .groups
            .update_one(
                doc! { "_id": group_id },
                doc! { "$pull": { "members": user_id } },
            )
            .await?
            .ok_or_else(group_not_found)?;

        if let Err(e) = self.progress.unlink_group(user_id, group_id).await {
            warn!(group_id, user_id, error = %e, "Failed to update group mirror");
        }
        info!(group_id, user_id, "Member removed");
        Ok(group)
    }

    /// Groups the user belongs to, oldest first. The progress mirror is
    /// rewritten when it disagrees with the membership lists.
    pub async fn groups_for_user(&self, user_id: &str) -> Result<Vec<GroupDoc>> {
        let groups = self
            .groups
            .find_sorted(doc! { "members": user_id }, Some(doc! { "createdAt": 1 }))
            .await?;
        let record = self.progress.find(user_id).await?;

        if record.is_none() && groups.is_empty() {
            return Err(HearthError::NotFound("User not found".into()));
        }

        let ids: Vec<String> = groups.iter().map(|group| group.id.clone()).collect();
        let drifted = record.map_or(true, |record| {
            let mut mirrored = record.groups;
            let mut expected = ids.clone();
            mirrored.sort();
            expected.sort();
            mirrored != expected
        });

        if drifted {
            debug!(user_id, groups = ids.len(), "Repairing group mirror");
            if let Err(e) = self.progress.set_groups(user_id, &ids).await {
                warn!(user_id, error = %e, "Failed to repair group mirror");
            }
        }

        Ok(groups)
    }

    async fn mirror_join(&self, user_id: &str, group_id: &str) {
        if let Err(e) = self.progress.link_group(user_id, group_id).await {
            warn!(group_id, user_id, error = %e, "Failed to update group mirror");
        }
    }
}

fn group_not_found() -> HearthError {
    HearthError::NotFound("Group not found".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service() -> GroupService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        GroupService::new(Arc::clone(&store), ProgressService::new(store))
    }

    fn hikers(members: &[&str]) -> NewGroup {
        NewGroup {
            name: "Hikers".into(),
            description: Some("Weekend trails".into()),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_mirrors_into_progress() {
        let service = service();
        let group = service.create(hikers(&["u1"])).await.unwrap();

        let groups = service.groups_for_user("u1").await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Hikers");

        let record = service.progress.get("u1").await.unwrap();
        assert_eq!(record.groups, vec![group.id]);
    }

    #[tokio::test]
    async fn test_add_member_twice_keeps_one_entry() {
        let service = service();
        let group = service.create(hikers(&[])).await.unwrap();

        service.add_member(&group.id, "u2").await.unwrap();
        let group = service.add_member(&group.id, "u2").await.unwrap();
        assert_eq!(group.members, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_missing_group() {
        let service = service();
        let err = service.add_member("nope", "u1").await.unwrap_err();
        assert_eq!(err.public_message(), "Group not found");
        let err = service.get("nope").await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remove_member() {
        let service = service();
        let group = service.create(hikers(&["u1", "u2"])).await.unwrap();

        let group = service.remove_member(&group.id, "u1").await.unwrap();
        assert_eq!(group.members, vec!["u2"]);
        assert!(service.groups_for_user("u1").await.unwrap().is_empty());
        assert!(service.progress.get("u1").await.unwrap().groups.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_groups() {
        let err = service().groups_for_user("ghost").await.unwrap_err();
        assert_eq!(err.public_message(), "User not found");
    }

    #[tokio::test]
    async fn test_drifted_mirror_is_repaired() {
        let service = service();
        let group = service.create(hikers(&["u1"])).await.unwrap();
        service.progress.set_groups("u1", &[]).await.unwrap();

        service.groups_for_user("u1").await.unwrap();
        let record = service.progress.get("u1").await.unwrap();
        assert_eq!(record.groups, vec![group.id]);
    }
}
