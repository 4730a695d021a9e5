use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{deserialize_optional_timestamp, deserialize_timestamp, null_as_default};

/// Public view of a registered user. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_image: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user-authored post with an image reference and a set of liking users.
///
/// `likes` and `likes_count` decode to empty/zero when the server omits them
/// or sends `null`. The count is never derived locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}
