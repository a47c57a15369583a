use actix_cors::Cors;
use deadpool_redis::{Runtime, redis::AsyncCommands};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{ENV, api::error};

pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let database_url = &ENV.database_url;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database migrations applied");

    Ok(pool)
}

pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    pub async fn new() -> Result<Self, error::SystemError> {
        let mut cfg = deadpool_redis::Config::from_url(&ENV.redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }

    /// Reads and removes `key` in one round trip, so only one caller ever
    /// observes a given value.
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>, error::SystemError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut conn = self.pool.get().await?;

        let value: Option<Vec<u8>> = conn.get_del(key).await?;

        value.map(|v| serde_json::from_slice(&v)).transpose().map_err(Into::into)
    }

    pub async fn set<T>(
        &self,
        key: &str,
        value: &T,
        expiration: u64,
    ) -> Result<(), error::SystemError>
    where
        T: serde::Serialize,
    {
        let mut conn = self.pool.get().await?;

        let serialized = serde_json::to_vec(value)?;

        conn.set_ex::<_, _, ()>(key, serialized, expiration).await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Browser access is limited to the configured frontend. Tokens travel in
/// request bodies and the `Authorization` header, never in cookies.
pub fn cors() -> Cors {
    Cors::default()
        .allowed_origin(ENV.frontend_url.as_str())
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::header, test, web};

    use super::*;
    use crate::test::init_env;

    #[actix_web::test]
    async fn cors_allows_the_frontend_without_credentials() {
        init_env();
        let app =
            test::init_service(App::new().wrap(cors()).route("/", web::get().to(HttpResponse::Ok)))
                .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, ENV.frontend_url.as_str()))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
            Some(ENV.frontend_url.as_str())
        );
        assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
