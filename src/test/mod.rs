use std::sync::{Arc, LazyLock, Once};

use actix_web::{
    Error, HttpMessage,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};
use uuid::Uuid;

use crate::{
    ENV,
    modules::{
        friend::{
            error::FriendRequestError,
            model::{InsertFriendRequest, RequestOrdering},
            rate_limit::RateLimitPolicy,
            repository::FriendRequestRepository,
            repository_memory::FriendRequestRepositoryMemory,
            schema::{FriendRequestEntity, FriendRequestStatus},
            service::FriendService,
        },
        user::{
            model::InsertUser, repository::UserRepository, repository_memory::UserRepositoryMemory,
        },
    },
    utils::{Claims, TypeClaims},
};

pub const TEST_USER_HEADER: &str = "x-test-user";

static TEST_ENV: Once = Once::new();

/// Fills in the variables `ENV` insists on, then forces it.
pub fn init_env() {
    TEST_ENV.call_once(|| {
        for (key, value) in [
            ("SECRET_KEY", "test-secret-key"),
            ("DATABASE_URL", "postgres://localhost/social_network_test"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ] {
            if std::env::var_os(key).is_none() {
                std::env::set_var(key, value);
            }
        }
    });
    LazyLock::force(&ENV);
}

pub async fn seed_user(repo: &UserRepositoryMemory, email: &str, username: &str) -> Uuid {
    repo.create(&InsertUser {
        email: email.to_string(),
        username: username.to_string(),
        hash_password: "not-a-real-hash".to_string(),
    })
    .await
    .expect("seed user")
}

pub struct FriendFixture {
    pub users: Arc<UserRepositoryMemory>,
    pub requests: Arc<FriendRequestRepositoryMemory>,
    pub service: FriendService,
}

impl FriendFixture {
    pub fn new() -> Self {
        Self::with_policy(RateLimitPolicy::default())
    }

    pub fn with_policy(policy: RateLimitPolicy) -> Self {
        let users = Arc::new(UserRepositoryMemory::new());
        let requests = Arc::new(FriendRequestRepositoryMemory::new());
        let service = FriendService::with_dependencies(requests.clone(), users.clone(), policy);
        Self { users, requests, service }
    }

    /// The service sees the store through [`YieldingFriendRequests`], so sends
    /// joined on one task interleave at the duplicate lookup.
    pub fn interleaved() -> Self {
        let users = Arc::new(UserRepositoryMemory::new());
        let requests = Arc::new(FriendRequestRepositoryMemory::new());
        let service = FriendService::with_dependencies(
            Arc::new(YieldingFriendRequests(requests.clone())),
            users.clone(),
            RateLimitPolicy::default(),
        );
        Self { users, requests, service }
    }

    pub async fn user(&self, name: &str) -> Uuid {
        seed_user(&self.users, &format!("{name}@example.com"), name).await
    }
}

/// Memory store that yields right after answering `find_existing`.
pub struct YieldingFriendRequests(Arc<FriendRequestRepositoryMemory>);

#[async_trait::async_trait]
impl FriendRequestRepository for YieldingFriendRequests {
    async fn find_existing(
        &self,
        from_user_id: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        let existing = self.0.find_existing(from_user_id, to_user_id).await;
        tokio::task::yield_now().await;
        existing
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        self.0.find_by_id(request_id).await
    }

    async fn find_recent_sent(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        self.0.find_recent_sent(user_id, limit).await
    }

    async fn insert(
        &self,
        request: &InsertFriendRequest,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        self.0.insert(request).await
    }

    async fn find_sent_by(
        &self,
        user_id: &Uuid,
        ordering: RequestOrdering,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        self.0.find_sent_by(user_id, ordering).await
    }

    async fn find_pending_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        self.0.find_pending_to(user_id).await
    }

    async fn update_status(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        acting_user_id: &Uuid,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        self.0.update_status(request_id, status, acting_user_id).await
    }

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        self.0.find_accepted_involving(user_id).await
    }
}

/// Stands in for the bearer-token middleware: trusts a user id header.
pub async fn inject_claims<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let user_id = req
        .headers()
        .get(TEST_USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());

    if let Some(id) = user_id {
        req.extensions_mut().insert(Claims::new(&id, 60).with_type(TypeClaims::AccessToken));
    }

    next.call(req).await
}
