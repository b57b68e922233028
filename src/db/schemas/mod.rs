//! Database schemas for Hearth
//!
//! Defines the document structures for every collection, their indexes, and
//! the client payloads used to create them.

mod achievement;
mod challenge;
mod check_in;
mod event;
mod friends;
mod group;
mod notification;
mod progress;
pub mod timestamp;
mod user;

pub use achievement::{AchievementDoc, NewAchievement, Reward, ACHIEVEMENT_COLLECTION};
pub use challenge::{ChallengeDoc, NewChallenge, CHALLENGE_COLLECTION};
pub use check_in::{CheckInDoc, NewCheckIn, CHECK_IN_COLLECTION};
pub use event::{EventDoc, NewEvent, Visibility, EVENT_COLLECTION};
pub use friends::{
    clamp_trust, ordered_pair, FriendsDoc, FriendshipDoc, FRIENDSHIP_COLLECTION,
    FRIENDS_COLLECTION, MAX_TRUST_LEVEL,
};
pub use group::{GroupDoc, NewGroup, GROUP_COLLECTION};
pub use notification::{NewNotification, NotificationDoc, NOTIFICATION_COLLECTION};
pub use progress::{Favorite, Goal, SocialGoals, UserProgressDoc, PROGRESS_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};

use crate::db::MongoStore;
use crate::types::{HearthError, Result};

/// Reject required string fields that are empty or whitespace
pub(crate) fn require<S: AsRef<str>>(fields: &[(&str, S)]) -> Result<()> {
    match fields
        .iter()
        .find(|(_, value)| value.as_ref().trim().is_empty())
    {
        Some((field, _)) => Err(HearthError::BadRequest(format!("`{}` is required", field))),
        None => Ok(()),
    }
}

/// Create the indexes of every collection
pub async fn ensure_indexes(store: &MongoStore) -> Result<()> {
    store.apply_indexes::<EventDoc>().await?;
    store.apply_indexes::<CheckInDoc>().await?;
    store.apply_indexes::<UserDoc>().await?;
    store.apply_indexes::<AchievementDoc>().await?;
    store.apply_indexes::<UserProgressDoc>().await?;
    store.apply_indexes::<GroupDoc>().await?;
    store.apply_indexes::<NotificationDoc>().await?;
    store.apply_indexes::<FriendsDoc>().await?;
    store.apply_indexes::<FriendshipDoc>().await?;
    store.apply_indexes::<ChallengeDoc>().await?;
    Ok(())
}
