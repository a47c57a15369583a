use uuid::Uuid;

use crate::modules::friend::{
    error::FriendRequestError,
    model::{InsertFriendRequest, RequestOrdering},
    schema::{FriendRequestEntity, FriendRequestStatus},
};

/// Persistence for directed friend requests. Implementations own every write to
/// a request row; status only changes through `update_status`.
#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_existing(
        &self,
        from_user_id: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError>;

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError>;

    /// The sender's latest `limit` requests, newest first.
    async fn find_recent_sent(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError>;

    /// Fails with `SelfRequest` or `DuplicateRequest` when the pair is not allowed.
    async fn insert(
        &self,
        request: &InsertFriendRequest,
    ) -> Result<FriendRequestEntity, FriendRequestError>;

    async fn find_sent_by(
        &self,
        user_id: &Uuid,
        ordering: RequestOrdering,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError>;

    async fn find_pending_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError>;

    /// Atomically moves a pending request addressed to `acting_user_id` into
    /// `status`.
    async fn update_status(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        acting_user_id: &Uuid,
    ) -> Result<FriendRequestEntity, FriendRequestError>;

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError>;
}
