use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A credential store record.
///
/// Deliberately does not derive `Serialize`: the password hash and provider
/// ids must never reach a response body. Convert with [`User::into_public`]
/// before returning a user to a client.
///
/// Every creation path guarantees at least one authentication method
/// (a password hash or a provider id); the schema does not enforce this.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    /// Unique when present. Absent only for OAuth accounts whose provider
    /// asserted no email. Stored trimmed and lowercased.
    pub email: Option<String>,
    /// Absent for pure-OAuth accounts.
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub github_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The sanitized projection of a [`User`], safe to serialize.
///
/// Also serves as the per-request session context: the session middleware
/// resolves this shape (hash excluded at the SQL level) and binds it to the
/// request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Emails are unique case-insensitively; normalize once at every boundary
/// (sign-up, sign-in, account linking) so lookups and the unique index agree.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
        assert_eq!(normalize_email("ann@example.com"), "ann@example.com");
    }

    #[test]
    fn test_into_public_drops_credentials() {
        let now = Utc::now();
        let user = User {
            id: 7,
            name: "Ann Lee".to_string(),
            email: Some("ann@example.com".to_string()),
            password_hash: Some("$2b$10$abcdefghijklmnopqrstuv".to_string()),
            google_id: Some("g-123".to_string()),
            github_id: None,
            created_at: now,
            updated_at: now,
        };

        let public = user.into_public();
        let body = serde_json::to_value(&public).unwrap();

        assert_eq!(body["id"], 7);
        assert_eq!(body["name"], "Ann Lee");
        assert_eq!(body["email"], "ann@example.com");
        assert!(body.get("password_hash").is_none());
        assert!(body.get("google_id").is_none());
        assert!(body.get("github_id").is_none());
    }
}
