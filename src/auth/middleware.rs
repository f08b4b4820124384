//! Session middleware.
//!
//! Every protected scope is wrapped in [`SessionMiddleware`]. Per request it
//! extracts a token (cookie first, `Bearer` header as the fallback for
//! non-cookie clients), verifies it, resolves the user it names, and binds
//! the sanitized user to the request as the session context. Any failure
//! rejects the request with 401 before a handler runs. Tenant scoping of
//! task data starts here, not in the storage layer.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::cookie::TOKEN_COOKIE;
use crate::auth::token::TokenIssuer;
use crate::error::AppError;
use crate::models::user::PublicUser;

pub struct SessionMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    // Rc because resolving the user awaits the pool before forwarding.
    service: Rc<S>,
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match extract_token(&req) {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthorized(
                        "No token provided, authorization denied".into(),
                    )
                    .into())
                }
            };

            let issuer = req
                .app_data::<web::Data<TokenIssuer>>()
                .ok_or_else(|| {
                    AppError::InternalServerError("Token issuer not configured".into())
                })?;
            let user_id = issuer.verify(&token)?;

            let pool = req.app_data::<web::Data<PgPool>>().ok_or_else(|| {
                AppError::InternalServerError("Database pool not configured".into())
            })?;

            // Password hash stays out of the session context.
            let user = sqlx::query_as::<_, PublicUser>(
                "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
            )
            .bind(user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(AppError::from)?;

            let user = match user {
                // Token outlived its user, e.g. the account was deleted.
                Some(user) => user,
                None => {
                    return Err(AppError::Unauthorized(
                        "User not found, authorization denied".into(),
                    )
                    .into())
                }
            };

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_token_prefers_cookie() {
        let req = TestRequest::default()
            .cookie(actix_web::cookie::Cookie::new(TOKEN_COOKIE, "cookie-token"))
            .insert_header(("Authorization", "Bearer header-token"))
            .to_srv_request();

        assert_eq!(extract_token(&req).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_extract_token_falls_back_to_bearer_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer header-token"))
            .to_srv_request();

        assert_eq!(extract_token(&req).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_extract_token_ignores_cleared_cookie() {
        // A freshly signed-out client may still send the emptied cookie.
        let req = TestRequest::default()
            .cookie(actix_web::cookie::Cookie::new(TOKEN_COOKIE, ""))
            .to_srv_request();

        assert_eq!(extract_token(&req), None);
    }

    #[test]
    fn test_extract_token_rejects_non_bearer_scheme() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_srv_request();

        assert_eq!(extract_token(&req), None);
    }

    #[test]
    fn test_extract_token_absent() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(extract_token(&req), None);
    }
}
