use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::ENV;
use crate::api::error;
use crate::modules::auth::{
    model::{SignInModel, SignUpModel, TokenPair},
    repository::RefreshTokenRepository,
};
use crate::modules::user::{model::InsertUser, repository::UserRepository};
use crate::utils::{Claims, TypeClaims, hash_password, verify_password};

/// Issues and revokes the tokens the rest of the API authenticates with.
#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
}

impl AuthService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    ) -> Self {
        info!("AuthService initialized with dependencies");
        AuthService { repo, tokens }
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            email: user.email.trim().to_lowercase(),
            username: user.username,
            hash_password,
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("User {user_id} signed up");
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<TokenPair, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(user.email.trim())
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid Credentials"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            warn!("Failed sign in attempt for user {}", user_entity.id);
            return Err(error::SystemError::unauthorized("Invalid Credentials"));
        }

        self.issue_tokens(&user_entity.id).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, error::SystemError> {
        let claims = Claims::decode(refresh_token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        let jti = match (claims.is_refresh(), claims.jti) {
            (true, Some(jti)) => jti,
            _ => return Err(error::SystemError::unauthorized("Token Invalid or Expired")),
        };

        // taking the entry revokes it, so a replayed token finds nothing
        let owner = self.tokens.take(&jti).await?;
        if owner != Some(claims.sub) {
            warn!("Refresh token {jti} reused or revoked");
            return Err(error::SystemError::unauthorized("Token Invalid or Expired"));
        }

        self.issue_tokens(&claims.sub).await
    }

    pub async fn sign_out(&self, refresh_token: &str) -> Result<(), error::SystemError> {
        // an unreadable token has nothing left to revoke
        let Ok(claims) = Claims::decode(refresh_token, ENV.jwt_secret.as_ref()) else {
            return Ok(());
        };

        if let Some(jti) = claims.jti {
            self.tokens.revoke(&jti).await?;
            info!("User {} signed out", claims.sub);
        }
        Ok(())
    }

    async fn issue_tokens(&self, user_id: &Uuid) -> Result<TokenPair, error::SystemError> {
        let access = Claims::new(user_id, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let refresh = Claims::new(user_id, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        self.tokens.save(&jti, user_id, ENV.refresh_token_expiration).await?;

        Ok(TokenPair { access, refresh })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        auth::repository_memory::RefreshTokenRepositoryMemory,
        user::repository_memory::UserRepositoryMemory,
    };
    use crate::test::init_env;

    struct Harness {
        tokens: Arc<RefreshTokenRepositoryMemory>,
        service: AuthService,
    }

    fn harness() -> Harness {
        init_env();
        let tokens = Arc::new(RefreshTokenRepositoryMemory::new());
        let service = AuthService::with_dependencies(
            Arc::new(UserRepositoryMemory::new()),
            tokens.clone(),
        );
        Harness { tokens, service }
    }

    async fn register(service: &AuthService, email: &str) -> Uuid {
        service
            .sign_up(SignUpModel {
                email: email.to_string(),
                username: "alice".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap()
    }

    fn login(email: &str, password: &str) -> SignInModel {
        SignInModel { email: email.to_string(), password: password.to_string() }
    }

    fn decode(token: &str) -> Claims {
        Claims::decode(token, ENV.jwt_secret.as_ref()).unwrap()
    }

    #[actix_web::test]
    async fn sign_in_issues_an_access_and_a_registered_refresh_token() {
        let h = harness();
        let user_id = register(&h.service, " Alice@Example.com").await;

        let pair = h.service.sign_in(login("alice@example.com", "correct horse")).await.unwrap();

        let access = decode(&pair.access);
        assert!(access.is_access());
        assert_eq!(access.sub, user_id);
        let refresh = decode(&pair.refresh);
        assert!(refresh.is_refresh());
        assert!(refresh.jti.is_some());
        assert_eq!(h.tokens.len(), 1);
    }

    #[actix_web::test]
    async fn bad_credentials_are_unauthorized() {
        let h = harness();
        register(&h.service, "alice@example.com").await;

        for attempt in [login("alice@example.com", "wrong horse"), login("bob@example.com", "x")] {
            assert!(matches!(
                h.service.sign_in(attempt).await,
                Err(error::SystemError::Unauthorized(_))
            ));
        }
        assert_eq!(h.tokens.len(), 0);
    }

    #[actix_web::test]
    async fn signing_up_twice_with_one_email_conflicts() {
        let h = harness();
        register(&h.service, "alice@example.com").await;

        let again = h
            .service
            .sign_up(SignUpModel {
                email: "ALICE@example.com".to_string(),
                username: "other".to_string(),
                password: "another pass".to_string(),
            })
            .await;
        assert!(matches!(again, Err(error::SystemError::Conflict(_))));
    }

    #[actix_web::test]
    async fn refresh_rotates_and_the_old_token_is_single_use() {
        let h = harness();
        let user_id = register(&h.service, "alice@example.com").await;
        let first = h.service.sign_in(login("alice@example.com", "correct horse")).await.unwrap();

        let second = h.service.refresh(&first.refresh).await.unwrap();
        assert_eq!(decode(&second.access).sub, user_id);
        assert_ne!(decode(&second.refresh).jti, decode(&first.refresh).jti);
        assert_eq!(h.tokens.len(), 1);

        assert!(matches!(
            h.service.refresh(&first.refresh).await,
            Err(error::SystemError::Unauthorized(_))
        ));
        h.service.refresh(&second.refresh).await.unwrap();
    }

    #[actix_web::test]
    async fn concurrent_refreshes_with_one_token_yield_one_pair() {
        let h = harness();
        register(&h.service, "alice@example.com").await;
        let pair = h.service.sign_in(login("alice@example.com", "correct horse")).await.unwrap();

        let (a, b) = tokio::join!(h.service.refresh(&pair.refresh), h.service.refresh(&pair.refresh));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(h.tokens.len(), 1);
    }

    #[actix_web::test]
    async fn access_tokens_cannot_refresh() {
        let h = harness();
        register(&h.service, "alice@example.com").await;
        let pair = h.service.sign_in(login("alice@example.com", "correct horse")).await.unwrap();

        assert!(matches!(
            h.service.refresh(&pair.access).await,
            Err(error::SystemError::Unauthorized(_))
        ));
        assert!(matches!(
            h.service.refresh("not a token").await,
            Err(error::SystemError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn sign_out_revokes_the_refresh_token() {
        let h = harness();
        register(&h.service, "alice@example.com").await;
        let pair = h.service.sign_in(login("alice@example.com", "correct horse")).await.unwrap();

        h.service.sign_out(&pair.refresh).await.unwrap();
        assert_eq!(h.tokens.len(), 0);
        assert!(h.service.refresh(&pair.refresh).await.is_err());

        // unreadable tokens have nothing to revoke
        h.service.sign_out("garbage").await.unwrap();
    }
}
