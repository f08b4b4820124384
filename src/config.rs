use std::env;

use crate::oauth::provider::Provider;

/// Runtime environment mode. Affects cookie flags only: production cookies
/// are `Secure` + `SameSite=None` so they survive the cross-site hop from
/// the hosted frontend; development relaxes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Client credentials and callback URL for one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub environment: Environment,
    pub frontend_origin: String,
    pub google: OAuthProviderCredentials,
    pub github: OAuthProviderCredentials,
}

impl Config {
    pub fn from_env() -> Self {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port: u16 = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5500".to_string())
            .parse()
            .expect("SERVER_PORT must be a number");

        // Public base URL used in provider callback registrations. Behind a
        // proxy this differs from the bind address, hence the override.
        let server_url = env::var("SERVER_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("TOKEN_TTL_HOURS must be a number"),
            environment,
            frontend_origin: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            google: OAuthProviderCredentials {
                client_id: env::var("GOOGLE_CLIENT_ID")
                    .unwrap_or_else(|_| "YOUR_GOOGLE_CLIENT_ID".to_string()),
                client_secret: env::var("GOOGLE_CLIENT_SECRET")
                    .unwrap_or_else(|_| "YOUR_GOOGLE_CLIENT_SECRET".to_string()),
                callback_url: format!("{}/api/v1/auth/google/callback", server_url),
            },
            github: OAuthProviderCredentials {
                client_id: env::var("GITHUB_CLIENT_ID")
                    .unwrap_or_else(|_| "YOUR_GITHUB_CLIENT_ID".to_string()),
                client_secret: env::var("GITHUB_CLIENT_SECRET")
                    .unwrap_or_else(|_| "YOUR_GITHUB_CLIENT_SECRET".to_string()),
                callback_url: format!("{}/api/v1/auth/github/callback", server_url),
            },
            server_host,
            server_port,
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn provider_credentials(&self, provider: Provider) -> &OAuthProviderCredentials {
        match provider {
            Provider::Google => &self.google,
            Provider::Github => &self.github,
        }
    }
}
