//! Auth cookie lifecycle.
//!
//! The identity token travels in an http-only cookie. In production the
//! frontend is served from another origin, so the cookie must be `Secure`
//! with `SameSite=None`; in development both are relaxed so plain-HTTP
//! localhost setups work.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::config::Environment;

pub const TOKEN_COOKIE: &str = "token";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

// An abandoned OAuth redirect should not leave a live state nonce around.
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

fn same_site(environment: Environment) -> SameSite {
    if environment.is_production() {
        SameSite::None
    } else {
        SameSite::Lax
    }
}

pub fn auth_cookie(token: String, environment: Environment, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(same_site(environment))
        .max_age(Duration::hours(ttl_hours))
        .finish()
}

/// Expires the auth cookie. Idempotent: clearing an absent cookie is fine.
pub fn clear_auth_cookie(environment: Environment) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(same_site(environment))
        .max_age(Duration::ZERO)
        .finish()
}

pub fn oauth_state_cookie(state: String, environment: Environment) -> Cookie<'static> {
    Cookie::build(OAUTH_STATE_COOKIE, state)
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(same_site(environment))
        .max_age(Duration::minutes(OAUTH_STATE_TTL_MINUTES))
        .finish()
}

pub fn clear_oauth_state_cookie(environment: Environment) -> Cookie<'static> {
    Cookie::build(OAUTH_STATE_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(environment.is_production())
        .same_site(same_site(environment))
        .max_age(Duration::ZERO)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_development_flags() {
        let cookie = auth_cookie("abc".to_string(), Environment::Development, 24);

        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_ne!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
    }

    #[test]
    fn test_auth_cookie_production_flags() {
        let cookie = auth_cookie("abc".to_string(), Environment::Production, 24);

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[test]
    fn test_clear_auth_cookie_expires_immediately() {
        let cookie = clear_auth_cookie(Environment::Development);

        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_oauth_state_cookie_is_short_lived() {
        let cookie = oauth_state_cookie("nonce".to_string(), Environment::Development);

        assert_eq!(cookie.name(), OAUTH_STATE_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(Duration::minutes(OAUTH_STATE_TTL_MINUTES))
        );
    }
}
