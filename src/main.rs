use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, NormalizePath, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    api::error,
    configs::{RedisCache, connect_database, cors},
    middlewares::authentication,
    modules::{
        auth::{repository_redis::RefreshTokenRepositoryRedis, service::AuthService},
        friend::{
            rate_limit::RateLimitPolicy, repository_pg::FriendRequestRepositoryPg,
            service::FriendService,
        },
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> Result<&'static str, error::Error> {
    sqlx::query("SELECT 1").execute(db_pool.get_ref()).await.map_err(|e| {
        log::error!("Health check failed: {e}");
        error::Error::internal_server_error()
    })?;
    Ok("Server is running")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRequestRepositoryPg::new(db_pool.clone()));

    let user_service = UserService::with_dependencies(user_repo.clone());
    let token_repo = Arc::new(RefreshTokenRepositoryRedis::new(Arc::new(redis_pool)));
    let auth_service = AuthService::with_dependencies(user_repo.clone(), token_repo);
    let friend_service = FriendService::with_dependencies(
        friend_repo,
        user_repo,
        RateLimitPolicy::new(ENV.friend_request_limit, ENV.friend_request_window_secs),
    );

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .service(
                web::scope("/api").configure(modules::auth::route::configure).service(
                    web::scope("")
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
