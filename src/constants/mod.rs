pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub friend_request_limit: usize,
    pub friend_request_window_secs: i64,
}

pub const DEFAULT_FRIEND_REQUEST_LIMIT: usize = 3;
pub const DEFAULT_FRIEND_REQUEST_WINDOW_SECS: i64 = 60;
pub const MAX_FRIEND_REQUEST_WINDOW_SECS: i64 = 86_400;

fn parse_window_secs(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_FRIEND_REQUEST_WINDOW_SECS).contains(secs))
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let refresh_token_expiration = std::env::var("REFRESH_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()
            .expect("REFRESH_TOKEN_EXPIRATION must be a valid u64 integer");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        let friend_request_limit = std::env::var("FRIEND_REQUEST_LIMIT")
            .map(|v| v.parse::<usize>().expect("FRIEND_REQUEST_LIMIT must be a valid usize integer"))
            .unwrap_or(DEFAULT_FRIEND_REQUEST_LIMIT);
        let friend_request_window_secs = std::env::var("FRIEND_REQUEST_WINDOW_SECS")
            .map(|v| {
                parse_window_secs(&v)
                    .expect("FRIEND_REQUEST_WINDOW_SECS must be an integer between 1 and 86400")
            })
            .unwrap_or(DEFAULT_FRIEND_REQUEST_WINDOW_SECS);

        Env {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
            workers,
            friend_request_limit,
            friend_request_window_secs,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
