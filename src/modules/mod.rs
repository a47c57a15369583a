pub mod auth {
    pub mod handle;
    pub mod model;
    pub mod repository;
    #[cfg(test)]
    pub mod repository_memory;
    pub mod repository_redis;
    pub mod route;
    pub mod service;
}

pub mod user {
    pub mod handle;
    pub mod model;
    pub mod repository;
    #[cfg(test)]
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod friend {
    pub mod error;
    pub mod handle;
    pub mod model;
    pub mod rate_limit;
    pub mod repository;
    #[cfg(test)]
    pub mod repository_memory;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}
