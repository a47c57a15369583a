use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::{ENV, api::error, utils::Claims};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))?;

    if !claims.is_access() {
        log::debug!("Rejected non-access token for user {}", claims.sub);
        return Err(error::Error::unauthorized("Token Invalid or Expired").into());
    }

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_extensions<T>(req: &HttpRequest) -> Result<T, error::Error>
where
    T: Clone + 'static,
{
    let extensions = req.extensions();

    let value =
        extensions.get::<T>().ok_or_else(|| error::Error::unauthorized("Unauthorized"))?.clone();

    Ok(value)
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    get_extensions::<Claims>(req)
}

#[cfg(test)]
mod tests {
    use actix_web::{
        App, HttpResponse,
        http::{StatusCode, header},
        middleware::from_fn,
        test, web,
    };
    use uuid::Uuid;

    use super::*;
    use crate::{test::init_env, utils::TypeClaims};

    async fn whoami(req: HttpRequest) -> Result<HttpResponse, error::Error> {
        let claims = get_claims(&req)?;
        Ok(HttpResponse::Ok().body(claims.sub.to_string()))
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .wrap(from_fn(authentication))
                    .route("/whoami", web::get().to(whoami)),
            )
            .await
        };
    }

    fn token(sub: &Uuid, kind: TypeClaims) -> String {
        Claims::new(sub, 60).with_type(kind).encode(ENV.jwt_secret.as_ref()).unwrap()
    }

    fn get(authorization: Option<String>) -> test::TestRequest {
        let req = test::TestRequest::get().uri("/whoami");
        match authorization {
            Some(value) => req.insert_header((header::AUTHORIZATION, value)),
            None => req,
        }
    }

    #[actix_web::test]
    async fn access_token_reaches_the_handler() {
        init_env();
        let app = app!();
        let sub = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let req = get(Some(format!("Bearer {}", token(&sub, TypeClaims::AccessToken))));
        let res = test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, sub.to_string());
    }

    #[actix_web::test]
    async fn missing_malformed_and_refresh_tokens_are_unauthorized() {
        init_env();
        let app = app!();
        let sub = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let refresh = token(&sub, TypeClaims::RefreshToken);

        for authorization in [
            None,
            Some("Bearer not-a-jwt".to_string()),
            Some(refresh.clone()),
            Some(format!("Bearer {refresh}")),
        ] {
            let status = match test::try_call_service(&app, get(authorization).to_request()).await {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }
}
