use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    friend::schema::{FriendRequestEntity, FriendRequestStatus},
    user::model::UserProfile,
};

/// A friend request with both endpoints expanded to their public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestDetail {
    pub id: Uuid,
    pub from_user: UserProfile,
    pub to_user: UserProfile,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestDetail {
    pub fn project(
        request: FriendRequestEntity,
        from_user: UserProfile,
        to_user: UserProfile,
    ) -> Self {
        debug_assert_eq!(request.from_user_id, from_user.id);
        debug_assert_eq!(request.to_user_id, to_user.id);
        FriendRequestDetail {
            id: request.id,
            from_user,
            to_user,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RequestOrdering {
    #[default]
    #[serde(rename = "created_at")]
    Oldest,
    #[serde(rename = "-created_at")]
    Newest,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListSentQuery {
    #[serde(default)]
    pub ordering: RequestOrdering,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFriendRequestBody {
    pub to_user: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RespondFriendRequestBody {
    pub status: FriendRequestStatus,
}

pub struct InsertFriendRequest {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
