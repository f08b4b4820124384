pub mod cookie;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::SessionMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

lazy_static! {
    // Same email shape the user store has always enforced: something, an @,
    // something, a dot, something. Stricter formats are the mail server's job.
    static ref EMAIL_REGEX: regex::Regex = regex::Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

/// Payload for `POST /auth/sign-up`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Display name, 3 to 50 characters.
    #[validate(length(min = 3, max = 50, message = "Name must be 3 to 50 characters long"))]
    pub name: String,
    #[validate(regex(path = "EMAIL_REGEX", message = "Please provide a valid email address"))]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Payload for `POST /auth/sign-in`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(regex(path = "EMAIL_REGEX", message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}
