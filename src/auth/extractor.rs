use crate::auth::verify_token;
use crate::config::Config;
use crate::error::ApiError;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Identity proven by the bearer token. Handlers take this by value for
/// protected routes, or `Option<AuthenticatedUser>` where anonymous access
/// is allowed and the derived flags simply come out false.
pub struct AuthenticatedUser {
    pub user_id: i64,
    #[allow(dead_code)]
    pub email: String,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = (|| {
            let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
            let config = req
                .app_data::<web::Data<Config>>()
                .ok_or(ApiError::Unauthorized)?;
            let claims =
                verify_token(token, &config.jwt.secret).map_err(|_| ApiError::Unauthorized)?;
            let user_id = claims.sub.parse::<i64>().map_err(|_| ApiError::Unauthorized)?;
            Ok(AuthenticatedUser {
                user_id,
                email: claims.email,
            })
        })();
        ready(result)
    }
}
