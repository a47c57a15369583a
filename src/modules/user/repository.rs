use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UserSearch},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    /// Users for the given ids, ordered by id. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;

    /// Directory search, never returning `excluding`. Results are ordered by id.
    async fn search(
        &self,
        query: &UserSearch,
        excluding: &Uuid,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
