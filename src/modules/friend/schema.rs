use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendRequestStatus {
    /// Whether the addressee may move a pending request into this status.
    pub fn is_decision(self) -> bool {
        matches!(self, FriendRequestStatus::Accepted | FriendRequestStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestEntity {
    /// The endpoint that is not `user_id`.
    pub fn other_party(&self, user_id: &Uuid) -> Uuid {
        if self.from_user_id == *user_id { self.to_user_id } else { self.from_user_id }
    }
}
