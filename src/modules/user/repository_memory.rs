use std::sync::Mutex;

use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UserSearch},
        repository::UserRepository,
        schema::UserEntity,
    },
};

/// In-process user directory with the same matching rules as the Postgres one.
#[derive(Default)]
pub struct UserRepositoryMemory {
    users: Mutex<Vec<UserEntity>>,
}

impl UserRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryMemory {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let users = self.users.lock().expect("user store poisoned");
        Ok(users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = self.users.lock().expect("user store poisoned");
        let mut found: Vec<UserEntity> =
            users.iter().filter(|u| ids.contains(&u.id)).cloned().collect();
        found.sort_by_key(|u| u.id);
        Ok(found)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let users = self.users.lock().expect("user store poisoned");
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let mut users = self.users.lock().expect("user store poisoned");
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(error::SystemError::conflict("uq_users_email", "duplicate email"));
        }

        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let now = chrono::Utc::now();
        users.push(UserEntity {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            hash_password: user.hash_password.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn search(
        &self,
        query: &UserSearch,
        excluding: &Uuid,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = self.users.lock().expect("user store poisoned");
        let mut found: Vec<UserEntity> = users
            .iter()
            .filter(|u| u.id != *excluding)
            .filter(|u| match query {
                UserSearch::Email(email) => u.email.eq_ignore_ascii_case(email),
                UserSearch::Username(fragment) => {
                    u.username.to_lowercase().contains(&fragment.to_lowercase())
                }
            })
            .cloned()
            .collect();
        found.sort_by_key(|u| u.id);
        Ok(found)
    }
}
