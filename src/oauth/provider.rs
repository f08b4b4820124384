use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::AppError;

/// Supported identity providers.
///
/// Each variant owns everything provider-specific: endpoints, scopes, the
/// credential store column its subject ids live in, and how to read its
/// profile payload. The handshake and callback code stay uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Github,
}

/// Endpoint set for one provider's authorization-code flow.
///
/// Separate from [`Provider`] so tests can point the handshake at a stub
/// server.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub user_info_url: String,
    /// GitHub hides private addresses from the profile payload; they have to
    /// be asked for through a dedicated endpoint.
    pub user_emails_url: Option<String>,
}

/// The uniform profile shape every provider's handshake produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub email: Option<String>,
    pub display_name: String,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }

    /// The credential store column holding this provider's subject ids.
    pub fn id_column(self) -> &'static str {
        match self {
            Provider::Google => "google_id",
            Provider::Github => "github_id",
        }
    }

    pub fn scopes(self) -> &'static str {
        match self {
            Provider::Google => "openid email profile",
            Provider::Github => "read:user user:email",
        }
    }

    pub fn endpoints(self) -> ProviderEndpoints {
        match self {
            Provider::Google => ProviderEndpoints {
                authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                user_info_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
                user_emails_url: None,
            },
            Provider::Github => ProviderEndpoints {
                authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                token_url: "https://github.com/login/oauth/access_token".to_string(),
                user_info_url: "https://api.github.com/user".to_string(),
                user_emails_url: Some("https://api.github.com/user/emails".to_string()),
            },
        }
    }

    /// Reads the provider's user-info payload into a [`ProviderProfile`].
    ///
    /// `fallback_email` is the result of the secondary emails lookup, used
    /// when the payload itself carries no address.
    pub fn parse_profile(
        self,
        user_info: &Value,
        fallback_email: Option<String>,
    ) -> Result<ProviderProfile, AppError> {
        let payload_email = user_info
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);
        let email = payload_email.or(fallback_email);

        match self {
            Provider::Google => {
                let provider_id = user_info
                    .get("sub")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        AppError::InternalServerError(
                            "Malformed profile response from google".into(),
                        )
                    })?
                    .to_string();

                let display_name = user_info
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| email.clone())
                    .unwrap_or_else(|| provider_id.clone());

                Ok(ProviderProfile {
                    provider_id,
                    email,
                    display_name,
                })
            }
            Provider::Github => {
                // GitHub ids are numeric in the payload.
                let provider_id = user_info
                    .get("id")
                    .and_then(Value::as_i64)
                    .map(|id| id.to_string())
                    .ok_or_else(|| {
                        AppError::InternalServerError(
                            "Malformed profile response from github".into(),
                        )
                    })?;

                let display_name = user_info
                    .get("name")
                    .and_then(Value::as_str)
                    .or_else(|| user_info.get("login").and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| provider_id.clone());

                Ok(ProviderProfile {
                    provider_id,
                    email,
                    display_name,
                })
            }
        }
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            other => Err(AppError::NotFound(format!(
                "Unknown authentication provider: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!("github".parse::<Provider>().unwrap(), Provider::Github);
        assert!(matches!(
            "gitlab".parse::<Provider>(),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_google_profile_parsing() {
        let payload = json!({
            "sub": "108177513594714",
            "name": "Ann Lee",
            "email": "ann@example.com"
        });

        let profile = Provider::Google.parse_profile(&payload, None).unwrap();
        assert_eq!(profile.provider_id, "108177513594714");
        assert_eq!(profile.display_name, "Ann Lee");
        assert_eq!(profile.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_google_profile_without_email() {
        let payload = json!({ "sub": "108177513594714", "name": "Ann Lee" });

        let profile = Provider::Google.parse_profile(&payload, None).unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(profile.display_name, "Ann Lee");
    }

    #[test]
    fn test_github_profile_uses_login_when_name_missing() {
        let payload = json!({ "id": 583231, "login": "annlee", "email": null });

        let profile = Provider::Github
            .parse_profile(&payload, Some("ann@example.com".to_string()))
            .unwrap();
        assert_eq!(profile.provider_id, "583231");
        assert_eq!(profile.display_name, "annlee");
        assert_eq!(profile.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_github_profile_prefers_payload_email() {
        let payload = json!({ "id": 583231, "login": "annlee", "email": "public@example.com" });

        let profile = Provider::Github
            .parse_profile(&payload, Some("fallback@example.com".to_string()))
            .unwrap();
        assert_eq!(profile.email.as_deref(), Some("public@example.com"));
    }

    #[test]
    fn test_malformed_profile_is_an_error() {
        assert!(Provider::Google.parse_profile(&json!({}), None).is_err());
        assert!(Provider::Github
            .parse_profile(&json!({ "id": "not-a-number" }), None)
            .is_err());
    }
}
