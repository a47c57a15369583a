use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            error::FriendRequestError,
            model::{FriendRequestDetail, InsertFriendRequest, RequestOrdering},
            rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter},
            repository::FriendRequestRepository,
            schema::{FriendRequestEntity, FriendRequestStatus},
        },
        user::{model::UserProfile, repository::UserRepository},
    },
};

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRequestRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    rate_limiter: RateLimiter,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRequestRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        policy: RateLimitPolicy,
    ) -> Self {
        info!(
            "FriendService initialized with a limit of {} requests per {}s",
            policy.max_requests,
            policy.window_secs()
        );
        let rate_limiter = RateLimiter::new(friend_repo.clone(), policy);
        FriendService { friend_repo, user_repo, rate_limiter }
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<FriendRequestDetail, FriendRequestError> {
        self.send_friend_request_at(sender_id, recipient_id, Utc::now()).await
    }

    pub async fn send_friend_request_at(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<FriendRequestDetail, FriendRequestError> {
        if sender_id == recipient_id {
            return Err(FriendRequestError::SelfRequest);
        }

        if self.user_repo.find_by_id(&recipient_id).await?.is_none() {
            return Err(FriendRequestError::RecipientNotFound);
        }

        if self.friend_repo.find_existing(&sender_id, &recipient_id).await?.is_some() {
            return Err(FriendRequestError::DuplicateRequest);
        }

        if let RateLimitDecision::Limited { retry_after } =
            self.rate_limiter.allow(&sender_id, now).await?
        {
            let policy = self.rate_limiter.policy();
            warn!("User {sender_id} hit the friend request limit, retry in {retry_after}s");
            return Err(FriendRequestError::RateLimited {
                limit: policy.max_requests,
                window_secs: policy.window_secs(),
                retry_after,
            });
        }

        let request = self
            .friend_repo
            .insert(&InsertFriendRequest {
                from_user_id: sender_id,
                to_user_id: recipient_id,
                created_at: now,
            })
            .await?;

        info!("Friend request {} sent from {sender_id} to {recipient_id}", request.id);
        self.project_one(request).await
    }

    pub async fn get_sent_requests(
        &self,
        user_id: Uuid,
        ordering: RequestOrdering,
    ) -> Result<Vec<FriendRequestDetail>, FriendRequestError> {
        let requests = self.friend_repo.find_sent_by(&user_id, ordering).await?;
        self.project(requests).await
    }

    pub async fn get_pending_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestDetail>, FriendRequestError> {
        let requests = self.friend_repo.find_pending_to(&user_id).await?;
        self.project(requests).await
    }

    pub async fn respond_to_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        status: FriendRequestStatus,
    ) -> Result<FriendRequestDetail, FriendRequestError> {
        let request = self
            .friend_repo
            .find_by_id(&request_id)
            .await?
            .ok_or(FriendRequestError::NotFound)?;

        if !status.is_decision() {
            return Err(FriendRequestError::InvalidStatus);
        }

        if request.to_user_id != user_id {
            warn!("User {user_id} tried to answer friend request {request_id} addressed to someone else");
            return Err(FriendRequestError::Forbidden);
        }

        if request.status != FriendRequestStatus::Pending {
            return Err(FriendRequestError::InvalidTransition);
        }

        // the store re-checks both guards under a row lock
        let updated = self.friend_repo.update_status(&request_id, status, &user_id).await?;

        info!("Friend request {request_id} marked {:?} by {user_id}", updated.status);
        self.project_one(updated).await
    }

    /// Everyone connected to `user_id` by an accepted request in either
    /// direction, ordered by id.
    pub async fn get_friends(&self, user_id: Uuid) -> Result<Vec<UserProfile>, FriendRequestError> {
        let accepted = self.friend_repo.find_accepted_involving(&user_id).await?;

        let friend_ids: Vec<Uuid> = accepted
            .iter()
            .map(|r| r.other_party(&user_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let friends = self.user_repo.find_by_ids(&friend_ids).await?;
        Ok(friends.into_iter().map(UserProfile::from).collect())
    }

    async fn project(
        &self,
        requests: Vec<FriendRequestEntity>,
    ) -> Result<Vec<FriendRequestDetail>, FriendRequestError> {
        let user_ids: Vec<Uuid> = requests
            .iter()
            .flat_map(|r| [r.from_user_id, r.to_user_id])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let profiles: HashMap<Uuid, UserProfile> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u)))
            .collect();

        let profile_of = |id: &Uuid| {
            profiles
                .get(id)
                .cloned()
                .ok_or_else(|| error::SystemError::not_found("User not found"))
        };

        requests
            .into_iter()
            .map(|r| -> Result<FriendRequestDetail, FriendRequestError> {
                let from_user = profile_of(&r.from_user_id)?;
                let to_user = profile_of(&r.to_user_id)?;
                Ok(FriendRequestDetail::project(r, from_user, to_user))
            })
            .collect()
    }

    async fn project_one(
        &self,
        request: FriendRequestEntity,
    ) -> Result<FriendRequestDetail, FriendRequestError> {
        self.project(vec![request])
            .await?
            .pop()
            .ok_or_else(|| error::SystemError::not_found("Friend request not found").into())
    }
}
