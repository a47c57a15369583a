use crate::modules::auth::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(sign_up).service(sign_in).service(refresh).service(sign_out);
}
