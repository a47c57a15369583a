use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::{api::error, modules::auth::repository::RefreshTokenRepository};

/// Token registry without expiry; entries live until taken or revoked.
#[derive(Default)]
pub struct RefreshTokenRepositoryMemory {
    tokens: Mutex<HashMap<Uuid, Uuid>>,
}

impl RefreshTokenRepositoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().expect("refresh token store poisoned").len()
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepository for RefreshTokenRepositoryMemory {
    async fn save(
        &self,
        jti: &Uuid,
        user_id: &Uuid,
        _ttl_secs: u64,
    ) -> Result<(), error::SystemError> {
        self.tokens.lock().expect("refresh token store poisoned").insert(*jti, *user_id);
        Ok(())
    }

    async fn take(&self, jti: &Uuid) -> Result<Option<Uuid>, error::SystemError> {
        Ok(self.tokens.lock().expect("refresh token store poisoned").remove(jti))
    }

    async fn revoke(&self, jti: &Uuid) -> Result<(), error::SystemError> {
        self.tokens.lock().expect("refresh token store poisoned").remove(jti);
        Ok(())
    }
}
