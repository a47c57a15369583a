use actix_web::{post, web};

use crate::{
    api::{error, success},
    modules::auth::{
        model::{RefreshTokenModel, SignInModel, SignUpModel, SignUpResponse, TokenPair},
        service::AuthService,
    },
    utils::ValidatedJson,
};

#[post("/signup")]
pub async fn sign_up(
    auth_service: web::Data<AuthService>,
    user_data: ValidatedJson<SignUpModel>,
) -> Result<success::Success<SignUpResponse>, error::Error> {
    let user_id = auth_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(SignUpResponse { id: user_id })).message("Signup successful"))
}

#[post("/login")]
pub async fn sign_in(
    auth_service: web::Data<AuthService>,
    user_data: ValidatedJson<SignInModel>,
) -> Result<success::Success<TokenPair>, error::Error> {
    let tokens = auth_service.sign_in(user_data.0).await?;
    Ok(success::Success::ok(Some(tokens)).message("Signin successful"))
}

#[post("/token/refresh")]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    body: ValidatedJson<RefreshTokenModel>,
) -> Result<success::Success<TokenPair>, error::Error> {
    let tokens = auth_service.refresh(&body.0.refresh).await?;
    Ok(success::Success::ok(Some(tokens)).message("Refresh successful"))
}

#[post("/logout")]
pub async fn sign_out(
    auth_service: web::Data<AuthService>,
    body: ValidatedJson<RefreshTokenModel>,
) -> Result<success::Success<()>, error::Error> {
    auth_service.sign_out(&body.0.refresh).await?;
    Ok(success::Success::no_content())
}
