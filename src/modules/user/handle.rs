use actix_web::{HttpRequest, get, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::user::{
        model::{SearchQuery, UserProfile},
        service::UserService,
    },
    utils::ValidatedQuery,
};

#[get("/me")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<UserProfile>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_profile(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[get("/search")]
pub async fn search_users(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<SearchQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<UserProfile>>, error::Error> {
    let id = get_claims(&req)?.sub;
    let users = user_service.search(id, &query.0.search).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}
