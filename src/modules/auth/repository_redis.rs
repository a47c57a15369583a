use std::sync::Arc;

use uuid::Uuid;

use crate::{api::error, configs::RedisCache, modules::auth::repository::RefreshTokenRepository};

fn refresh_key(jti: &Uuid) -> String {
    format!("refresh_token:{jti}")
}

pub struct RefreshTokenRepositoryRedis {
    cache: Arc<RedisCache>,
}

impl RefreshTokenRepositoryRedis {
    pub fn new(cache: Arc<RedisCache>) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepository for RefreshTokenRepositoryRedis {
    async fn save(
        &self,
        jti: &Uuid,
        user_id: &Uuid,
        ttl_secs: u64,
    ) -> Result<(), error::SystemError> {
        self.cache.set(&refresh_key(jti), user_id, ttl_secs).await
    }

    async fn take(&self, jti: &Uuid) -> Result<Option<Uuid>, error::SystemError> {
        self.cache.take::<Uuid>(&refresh_key(jti)).await
    }

    async fn revoke(&self, jti: &Uuid) -> Result<(), error::SystemError> {
        self.cache.delete(&refresh_key(jti)).await
    }
}
