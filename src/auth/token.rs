use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Claims encoded within an identity token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's unique identifier.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signs and verifies identity tokens.
///
/// Constructed once from [`Config`] and injected wherever tokens are minted
/// or checked; the signing secret never leaves this struct. Tokens are
/// stateless: validity is decided entirely by signature and expiry, so a
/// leaked token stays good until it expires.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl.num_hours()
    }

    /// Produces a signed token for `user_id`, expiring after the configured
    /// lifetime.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Validates signature and expiry, returning the embedded user id.
    ///
    /// All failure modes (malformed token, bad signature, expired) collapse
    /// into one opaque `Unauthorized` so callers cannot tell an attacker
    /// which check failed. The distinction is kept in the debug log.
    pub fn verify(&self, token: &str) -> Result<i32, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                AppError::Unauthorized("Authorization failed".into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test_secret_for_gen_verify", 24)
    }

    #[test]
    fn test_token_round_trip() {
        let token = issuer().issue(1).unwrap();
        let user_id = issuer().verify(&token).unwrap();
        assert_eq!(user_id, 1);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // A negative lifetime backdates the expiry past the decoder's leeway.
        let expired = TokenIssuer::new("test_secret_for_expiration", -2).issue(2).unwrap();

        match TokenIssuer::new("test_secret_for_expiration", 24).verify(&expired) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Authorization failed"),
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = issuer().issue(3).unwrap();

        // Flip the last character of the signature.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_ne!(token, tampered);

        assert!(issuer().verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenIssuer::new("one_secret", 24).issue(4).unwrap();
        let result = TokenIssuer::new("a_completely_different_secret", 24).verify(&token);

        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Authorization failed"),
            other => panic!("Expected opaque Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_token_error_is_opaque() {
        // Malformed input and a bad signature must be indistinguishable.
        let malformed = issuer().verify("not-even-a-jwt");
        let bad_signature =
            TokenIssuer::new("other_secret", 24).verify(&issuer().issue(5).unwrap());

        match (malformed, bad_signature) {
            (Err(AppError::Unauthorized(a)), Err(AppError::Unauthorized(b))) => {
                assert_eq!(a, b);
            }
            other => panic!("Expected two opaque Unauthorized errors, got {:?}", other),
        }
    }
}
