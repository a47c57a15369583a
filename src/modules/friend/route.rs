use crate::modules::friend::handle::*;
use actix_web::web::{ServiceConfig, scope};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/friend-requests")
            .service(list_pending_requests)
            .service(list_friends)
            .service(send_friend_request)
            .service(list_sent_requests)
            .service(respond_to_request),
    );
}
