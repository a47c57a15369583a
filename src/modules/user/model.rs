use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::schema::UserEntity;

/// Minimal public view of a user, embedded in friend request responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl From<UserEntity> for UserProfile {
    fn from(user: UserEntity) -> Self {
        UserProfile { id: user.id, email: user.email, username: user.username }
    }
}

#[derive(Deserialize, Validate)]
pub struct SearchQuery {
    #[serde(default)]
    #[validate(length(max = 254, message = "Search query is too long"))]
    pub search: String,
}

/// How a directory search is matched. A query containing `@` is treated as an
/// email address and must match exactly; anything else is a username fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSearch {
    Email(String),
    Username(String),
}

impl UserSearch {
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        if query.contains('@') {
            UserSearch::Email(query.to_lowercase())
        } else {
            UserSearch::Username(query.to_lowercase())
        }
    }
}

pub struct InsertUser {
    pub email: String,
    pub username: String,
    pub hash_password: String,
}
