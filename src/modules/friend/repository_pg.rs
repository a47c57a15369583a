use uuid::Uuid;

use crate::modules::friend::{
    error::FriendRequestError,
    model::{InsertFriendRequest, RequestOrdering},
    repository::FriendRequestRepository,
    schema::{FriendRequestEntity, FriendRequestStatus},
};

#[derive(Clone)]
pub struct FriendRequestRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRequestRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRequestRepositoryPg {
    async fn find_existing(
        &self,
        from_user_id: &Uuid,
        to_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE from_user_id = $1 AND to_user_id = $2",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, FriendRequestError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn find_recent_sent(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE from_user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn insert(
        &self,
        request: &InsertFriendRequest,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        if request.from_user_id == request.to_user_id {
            return Err(FriendRequestError::SelfRequest);
        }

        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        // uq_friend_requests_pair turns a concurrent duplicate into DuplicateRequest
        let created = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.from_user_id)
        .bind(request.to_user_id)
        .bind(FriendRequestStatus::Pending)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_sent_by(
        &self,
        user_id: &Uuid,
        ordering: RequestOrdering,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let sql = match ordering {
            RequestOrdering::Oldest => {
                "SELECT * FROM friend_requests WHERE from_user_id = $1 ORDER BY created_at ASC, id ASC"
            }
            RequestOrdering::Newest => {
                "SELECT * FROM friend_requests WHERE from_user_id = $1 ORDER BY created_at DESC, id DESC"
            }
        };

        let requests = sqlx::query_as::<_, FriendRequestEntity>(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn find_pending_to(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE to_user_id = $1
              AND status = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(FriendRequestStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn update_status(
        &self,
        request_id: &Uuid,
        status: FriendRequestStatus,
        acting_user_id: &Uuid,
    ) -> Result<FriendRequestEntity, FriendRequestError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(FriendRequestError::NotFound)?;

        if request.to_user_id != *acting_user_id {
            tx.rollback().await?;
            return Err(FriendRequestError::Forbidden);
        }

        if request.status != FriendRequestStatus::Pending || !status.is_decision() {
            tx.rollback().await?;
            return Err(FriendRequestError::InvalidTransition);
        }

        let updated = sqlx::query_as::<_, FriendRequestEntity>(
            "UPDATE friend_requests SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn find_accepted_involving(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, FriendRequestError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE status = $2
              AND (from_user_id = $1 OR to_user_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(FriendRequestStatus::Accepted)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
