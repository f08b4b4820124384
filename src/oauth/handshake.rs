//! The authorization-code handshake with an identity provider: building the
//! authorize redirect, exchanging the callback code for an access token, and
//! fetching the user profile. Provider failures never leak detail to the
//! client: a refused exchange reads the same as any other auth failure.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::OAuthProviderCredentials;
use crate::error::AppError;
use crate::oauth::provider::{Provider, ProviderEndpoints, ProviderProfile};

// GitHub's API refuses requests without a User-Agent.
const HTTP_USER_AGENT: &str = "taskforge";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    // Absent when the provider answers with an error payload.
    access_token: Option<String>,
}

/// Builds the provider's authorize URL the browser is redirected to.
pub fn authorize_redirect_url(
    provider: Provider,
    endpoints: &ProviderEndpoints,
    credentials: &OAuthProviderCredentials,
    state: &str,
) -> Result<String, AppError> {
    let url = reqwest::Url::parse_with_params(
        &endpoints.authorize_url,
        &[
            ("response_type", "code"),
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", credentials.callback_url.as_str()),
            ("scope", provider.scopes()),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::InternalServerError(format!("Invalid authorize URL: {}", e)))?;

    Ok(url.into())
}

/// Exchanges a one-time authorization code for an access token.
pub async fn exchange_code(
    http: &Client,
    endpoints: &ProviderEndpoints,
    credentials: &OAuthProviderCredentials,
    code: &str,
) -> Result<String, AppError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("redirect_uri", credentials.callback_url.as_str()),
    ];

    let response = http
        .post(&endpoints.token_url)
        // GitHub answers with form-encoding unless JSON is asked for.
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, HTTP_USER_AGENT)
        .form(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        log::debug!(
            "token exchange refused with status {}",
            response.status()
        );
        return Err(AppError::Unauthorized("Authorization failed".into()));
    }

    let body: TokenResponse = response.json().await?;
    body.access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Authorization failed".into()))
}

/// Fetches the provider profile for an access token, in the uniform
/// `{provider_id, email?, display_name}` shape.
pub async fn fetch_profile(
    http: &Client,
    provider: Provider,
    endpoints: &ProviderEndpoints,
    access_token: &str,
) -> Result<ProviderProfile, AppError> {
    let response = http
        .get(&endpoints.user_info_url)
        .bearer_auth(access_token)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, HTTP_USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        log::debug!("profile fetch refused with status {}", response.status());
        return Err(AppError::Unauthorized("Authorization failed".into()));
    }

    let user_info: Value = response.json().await?;

    let mut fallback_email = None;
    if user_info.get("email").map_or(true, Value::is_null) {
        if let Some(emails_url) = &endpoints.user_emails_url {
            fallback_email = fetch_primary_email(http, emails_url, access_token).await?;
        }
    }

    provider.parse_profile(&user_info, fallback_email)
}

/// Secondary lookup for providers that keep addresses off the profile
/// payload. Prefers the primary verified address; a missing email is not an
/// error (the account linker handles email-less profiles).
async fn fetch_primary_email(
    http: &Client,
    emails_url: &str,
    access_token: &str,
) -> Result<Option<String>, AppError> {
    let response = http
        .get(emails_url)
        .bearer_auth(access_token)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, HTTP_USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        log::debug!("emails fetch refused with status {}", response.status());
        return Ok(None);
    }

    let emails: Value = response.json().await?;

    Ok(emails.as_array().and_then(|list| {
        list.iter()
            .find(|entry| {
                entry["primary"].as_bool().unwrap_or(false)
                    && entry["verified"].as_bool().unwrap_or(false)
            })
            .or_else(|| list.first())
            .and_then(|entry| entry["email"].as_str())
            .map(str::to_string)
    }))
}
