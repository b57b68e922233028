//! Friendship document schemas
//!
//! Two relationship models live side by side and are never merged:
//!
//! - [`FriendsDoc`]: directed `userID → friendID` record with a trust level
//!   capped at [`MAX_TRUST_LEVEL`] and a bond level.
//! - [`FriendshipDoc`]: unordered pair with an unbounded interaction score.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::timestamp;
use crate::db::store::{new_id, Schema};

/// Collection name for trust/bond friendships
pub const FRIENDS_COLLECTION: &str = "friends";

/// Collection name for scored friendships
pub const FRIENDSHIP_COLLECTION: &str = "friendships";

/// Upper bound for `trustLevel`
pub const MAX_TRUST_LEVEL: i64 = 100;

const DEFAULT_TRUST_LEVEL: i64 = 50;

/// Trust/bond friendship stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendsDoc {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "userID")]
    pub user_id: String,

    #[serde(rename = "friendID")]
    pub friend_id: String,

    #[serde(default)]
    pub bond_level: i64,

    #[serde(default = "default_trust_level")]
    pub trust_level: i64,

    #[serde(default = "default_element")]
    pub friendship_element: String,

    #[serde(default = "default_aura_color")]
    pub aura_color: String,

    #[serde(with = "timestamp")]
    pub last_interaction: DateTime<Utc>,

    #[serde(default)]
    pub best_friend_status: bool,
}

fn default_trust_level() -> i64 {
    DEFAULT_TRUST_LEVEL
}

fn default_element() -> String {
    "none".to_string()
}

fn default_aura_color() -> String {
    "#FFFFFF".to_string()
}

impl FriendsDoc {
    pub fn new(user_id: String, friend_id: String) -> Self {
        Self {
            id: new_id(),
            user_id,
            friend_id,
            bond_level: 0,
            trust_level: DEFAULT_TRUST_LEVEL,
            friendship_element: default_element(),
            aura_color: default_aura_color(),
            last_interaction: timestamp::now(),
            best_friend_status: false,
        }
    }
}

/// Trust level after adding `amount`, never above [`MAX_TRUST_LEVEL`]
pub fn clamp_trust(current: i64, amount: i64) -> i64 {
    current.saturating_add(amount).min(MAX_TRUST_LEVEL)
}

impl Schema for FriendsDoc {
    const COLLECTION: &'static str = FRIENDS_COLLECTION;
}

impl IntoIndexes for FriendsDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userID": 1, "friendID": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_friend_unique".to_string())
                    .build(),
            ),
        )]
    }
}

/// Scored friendship between an unordered pair of users
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipDoc {
    #[serde(rename = "_id")]
    pub id: String,

    /// Lexically smaller user ID of the pair
    pub user_a: String,

    /// Lexically larger user ID of the pair
    pub user_b: String,

    #[serde(default)]
    pub score: i64,

    #[serde(with = "timestamp")]
    pub last_interaction: DateTime<Utc>,
}

/// Order a pair so (a, b) and (b, a) address the same record
pub fn ordered_pair<'a>(first: &'a str, second: &'a str) -> (&'a str, &'a str) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

impl Schema for FriendshipDoc {
    const COLLECTION: &'static str = FRIENDSHIP_COLLECTION;
}

impl IntoIndexes for FriendshipDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "userA": 1, "userB": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("pair_unique".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_trust() {
        assert_eq!(clamp_trust(50, 20), 70);
        assert_eq!(clamp_trust(90, 20), MAX_TRUST_LEVEL);
        assert_eq!(clamp_trust(100, 100), MAX_TRUST_LEVEL);
        assert_eq!(clamp_trust(50, -20), 30);
        assert_eq!(clamp_trust(i64::MAX, 1), MAX_TRUST_LEVEL);
    }

    #[test]
    fn test_ordered_pair() {
        assert_eq!(ordered_pair("bob", "amy"), ("amy", "bob"));
        assert_eq!(ordered_pair("amy", "bob"), ("amy", "bob"));
    }

    #[test]
    fn test_new_friends_defaults() {
        let friends = FriendsDoc::new("u1".into(), "u2".into());
        assert_eq!(friends.trust_level, 50);
        assert_eq!(friends.bond_level, 0);
        assert_eq!(friends.aura_color, "#FFFFFF");
        assert!(!friends.best_friend_status);
    }
}
