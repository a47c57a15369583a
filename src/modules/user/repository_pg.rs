use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UserSearch},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn like_pattern(fragment: &str) -> String {
    let escaped = fragment.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        sqlx::query(
            "INSERT INTO users (id, email, username, hash_password) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.hash_password)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn search(
        &self,
        query: &UserSearch,
        excluding: &Uuid,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = match query {
            UserSearch::Email(email) => {
                sqlx::query_as::<_, UserEntity>(
                    r#"
                    SELECT * FROM users
                    WHERE lower(email) = lower($1)
                    AND id <> $2
                    ORDER BY id
                    "#,
                )
                .bind(email)
                .bind(excluding)
                .fetch_all(&self.pool)
                .await?
            }
            UserSearch::Username(fragment) => {
                sqlx::query_as::<_, UserEntity>(
                    r#"
                    SELECT * FROM users
                    WHERE lower(username) LIKE lower($1) ESCAPE '\'
                    AND id <> $2
                    ORDER BY id
                    "#,
                )
                .bind(like_pattern(fragment))
                .bind(excluding)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }
}
