use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::user::PublicUser;

/// Extracts the session user bound to the request by `SessionMiddleware`.
///
/// Handlers take this as an argument instead of reading request extensions
/// directly; it is the only way a handler obtains the identity used for
/// tenant scoping. If the middleware did not run (or did not insert a user),
/// extraction fails with 401 rather than proceeding unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub PublicUser);

impl AuthenticatedUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }

    pub fn into_inner(self) -> PublicUser {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<PublicUser>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => {
                let err = AppError::Unauthorized(
                    "Session user missing from request. Ensure SessionMiddleware is active."
                        .to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Utc;

    fn session_user(id: i32) -> PublicUser {
        let now = Utc::now();
        PublicUser {
            id,
            name: "Ann Lee".to_string(),
            email: Some("ann@example.com".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(session_user(123));

        let mut payload = Payload::None;
        let extracted = AuthenticatedUser::from_request(&req, &mut payload).await;
        assert!(extracted.is_ok());
        assert_eq!(extracted.unwrap().id(), 123);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No session user inserted into extensions

        let mut payload = Payload::None;
        let result = AuthenticatedUser::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let err = result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
