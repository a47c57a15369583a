use uuid::Uuid;

use crate::api::error;

/// Live refresh tokens, keyed by their `jti`. A token is usable only while its
/// entry exists.
#[async_trait::async_trait]
pub trait RefreshTokenRepository {
    async fn save(
        &self,
        jti: &Uuid,
        user_id: &Uuid,
        ttl_secs: u64,
    ) -> Result<(), error::SystemError>;

    /// Removes the entry and returns its owner. Of several concurrent callers
    /// with the same `jti`, at most one gets `Some`.
    async fn take(&self, jti: &Uuid) -> Result<Option<Uuid>, error::SystemError>;

    async fn revoke(&self, jti: &Uuid) -> Result<(), error::SystemError>;
}
