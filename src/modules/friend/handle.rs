use actix_web::{HttpRequest, get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{
                CreateFriendRequestBody, FriendRequestDetail, ListSentQuery,
                RespondFriendRequestBody,
            },
            service::FriendService,
        },
        user::model::UserProfile,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<CreateFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestDetail>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let request = friend_service.send_friend_request(sender_id, body.0.to_user).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[get("")]
pub async fn list_sent_requests(
    friend_service: web::Data<FriendService>,
    query: ValidatedQuery<ListSentQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestDetail>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_sent_requests(user_id, query.0.ordering).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/pending")]
pub async fn list_pending_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestDetail>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_pending_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Pending friend requests retrieved successfully"))
}

#[get("/friends")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<UserProfile>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[patch("/{request_id:[0-9a-fA-F-]{36}}")]
pub async fn respond_to_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    body: ValidatedJson<RespondFriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestDetail>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let request =
        friend_service.respond_to_request(user_id, request_id.into_inner(), body.0.status).await?;

    Ok(success::Success::ok(Some(request)).message("Friend request updated successfully"))
}
