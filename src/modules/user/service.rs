use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::user::model::{UserProfile, UserSearch};
use crate::modules::user::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn search(
        &self,
        caller_id: Uuid,
        query: &str,
    ) -> Result<Vec<UserProfile>, error::SystemError> {
        let search = UserSearch::parse(query);
        debug!("User {caller_id} searching directory with {search:?}");
        let users = self.repo.search(&search, &caller_id).await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::seed_user;
    use crate::modules::user::repository_memory::UserRepositoryMemory;

    async fn directory() -> (UserService, Arc<UserRepositoryMemory>) {
        let repo = Arc::new(UserRepositoryMemory::new());
        (UserService::with_dependencies(repo.clone()), repo)
    }

    #[actix_web::test]
    async fn search_by_username_is_case_insensitive_substring() {
        let (service, repo) = directory().await;
        let caller = seed_user(&repo, "caller@example.com", "caller").await;
        let alice = seed_user(&repo, "alice@example.com", "Alice").await;
        let malice = seed_user(&repo, "malice@example.com", "mALICEious").await;
        seed_user(&repo, "bob@example.com", "bob").await;

        let found = service.search(caller, "alic").await.unwrap();
        let mut ids: Vec<Uuid> = found.iter().map(|p| p.id).collect();
        let mut expected = vec![alice, malice];
        ids.sort();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[actix_web::test]
    async fn search_with_at_sign_matches_exact_email_only() {
        let (service, repo) = directory().await;
        let caller = seed_user(&repo, "caller@example.com", "caller").await;
        let alice = seed_user(&repo, "alice@example.com", "alice").await;
        seed_user(&repo, "alice@example.org", "alice2").await;

        let found = service.search(caller, "ALICE@Example.com").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, alice);
        assert_eq!(found[0].email, "alice@example.com");

        assert!(service.search(caller, "alice@").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn search_never_returns_the_caller() {
        let (service, repo) = directory().await;
        let caller = seed_user(&repo, "carol@example.com", "carol").await;
        let other = seed_user(&repo, "caroline@example.com", "caroline").await;

        let found = service.search(caller, "carol").await.unwrap();
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![other]);

        assert!(service.search(caller, "carol@example.com").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn empty_query_lists_everyone_else_in_id_order() {
        let (service, repo) = directory().await;
        let caller = seed_user(&repo, "me@example.com", "me").await;
        seed_user(&repo, "a@example.com", "a").await;
        seed_user(&repo, "b@example.com", "b").await;

        let found = service.search(caller, "").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[actix_web::test]
    async fn get_profile_reports_missing_user() {
        let (service, repo) = directory().await;
        let id = seed_user(&repo, "me@example.com", "me").await;

        assert_eq!(service.get_profile(id).await.unwrap().username, "me");
        let missing = service.get_profile(Uuid::nil()).await;
        assert!(matches!(missing, Err(error::SystemError::NotFound(_))));
    }
}
