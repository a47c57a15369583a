use std::sync::Mutex;

use uuid::Uuid;

use crate::modules::friend::{
    error::FriendRequestError,
    model::{InsertFriendRequest, RequestOrdering},
    repository::FriendRequestRepository,
    schema::{FriendRequestEntity, FriendRequestStatus},
};

/// In-process request store. The pair check and the push happen under one lock,
/// standing in for the unique constraint of the Postgres table.
#[derive(Default)]
pub struct FriendRequestRepositoryMemory {
    requests: Mutex<Vec<FriendRequestEntity>>,
}

impl FriendRequestRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().expect("friend request store poisoned").len()
    }
}

fn store_order(a: &FriendRequestEntity, b: &FriendRequestEntity) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRequestRepositoryMemory {
    async fn find_existing(
        &self,
        from_user_id: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        Ok(requests
            .iter()
            .find(|r| r.from_user_id == *from_user_id && r.to_user_id == *to_user_id)
            .cloned())
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        Ok(requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_recent_sent(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        let mut sent: Vec<FriendRequestEntity> =
            requests.iter().filter(|r| r.from_user_id == *user_id).cloned().collect();
        sent.sort_by(|a, b| store_order(b, a));
        sent.truncate(limit);
        Ok(sent)
    }

    async fn insert(
        &self,
        request: &InsertFriendRequest,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        if request.from_user_id == request.to_user_id {
            return Err(FriendRequestError::SelfRequest);
        }

        let mut requests = self.requests.lock().expect("friend request store poisoned");
        if requests
            .iter()
            .any(|r| r.from_user_id == request.from_user_id && r.to_user_id == request.to_user_id)
        {
            return Err(FriendRequestError::DuplicateRequest);
        }

        let created = FriendRequestEntity {
            id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            status: FriendRequestStatus::Pending,
            created_at: request.created_at,
        };
        requests.push(created.clone());
        Ok(created)
    }

    async fn find_sent_by(
        &self,
        user_id: &Uuid,
        ordering: RequestOrdering,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        let mut sent: Vec<FriendRequestEntity> =
            requests.iter().filter(|r| r.from_user_id == *user_id).cloned().collect();
        match ordering {
            RequestOrdering::Oldest => sent.sort_by(store_order),
            RequestOrdering::Newest => sent.sort_by(|a, b| store_order(b, a)),
        }
        Ok(sent)
    }

    async fn find_pending_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        let mut pending: Vec<FriendRequestEntity> = requests
            .iter()
            .filter(|r| r.to_user_id == *user_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(store_order);
        Ok(pending)
    }

    async fn update_status(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        acting_user_id: &Uuid,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        let mut requests = self.requests.lock().expect("friend request store poisoned");
        let request = requests
            .iter_mut()
            .find(|r| r.id == *request_id)
            .ok_or(FriendRequestError::NotFound)?;

        if request.to_user_id != *acting_user_id {
            return Err(FriendRequestError::Forbidden);
        }

        if request.status != FriendRequestStatus::Pending || !status.is_decision() {
            return Err(FriendRequestError::InvalidTransition);
        }

        request.status = status;
        Ok(request.clone())
    }

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = self.requests.lock().expect("friend request store poisoned");
        Ok(requests
            .iter()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .filter(|r| r.from_user_id == *user_id || r.to_user_id == *user_id)
            .cloned()
            .collect())
    }
}
