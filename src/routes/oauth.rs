use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::cookie::{
    auth_cookie, clear_oauth_state_cookie, oauth_state_cookie, OAUTH_STATE_COOKIE,
};
use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::error::AppError;
use crate::oauth::{handshake, linker, Provider};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Start the provider handshake: redirect the browser to the provider's
/// authorize page, with a state nonce mirrored in a short-lived cookie.
#[get("/{provider}")]
pub async fn start(
    path: web::Path<String>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let provider: Provider = path.into_inner().parse()?;
    let credentials = config.provider_credentials(provider);

    let state = Uuid::new_v4().simple().to_string();
    let redirect = handshake::authorize_redirect_url(
        provider,
        &provider.endpoints(),
        credentials,
        &state,
    )?;

    Ok(HttpResponse::Found()
        .append_header(("Location", redirect))
        .cookie(oauth_state_cookie(state, config.environment))
        .finish())
}

/// Terminate the provider handshake.
///
/// Validates the state nonce, exchanges the code, fetches the profile,
/// resolves it through the account linker, then sets the auth cookie and
/// redirects to the frontend. The redirect is the whole response, no JSON
/// body on this path.
#[get("/{provider}/callback")]
pub async fn callback(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<CallbackQuery>,
    pool: web::Data<PgPool>,
    http: web::Data<reqwest::Client>,
    issuer: web::Data<TokenIssuer>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let provider: Provider = path.into_inner().parse()?;
    let credentials = config.provider_credentials(provider);

    let code = query
        .code
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Authorization failed".into()))?;

    let expected_state = req
        .cookie(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string());
    if expected_state.is_none() || query.state != expected_state {
        log::debug!("{} callback state mismatch", provider);
        return Err(AppError::Unauthorized("Authorization failed".into()));
    }

    let endpoints = provider.endpoints();
    let access_token =
        handshake::exchange_code(http.get_ref(), &endpoints, credentials, code).await?;
    let profile =
        handshake::fetch_profile(http.get_ref(), provider, &endpoints, &access_token).await?;

    let user = linker::resolve_profile(pool.get_ref(), provider, &profile).await?;
    let token = issuer.issue(user.id)?;

    Ok(HttpResponse::Found()
        .append_header(("Location", config.frontend_origin.clone()))
        .cookie(auth_cookie(token, config.environment, issuer.ttl_hours()))
        .cookie(clear_oauth_state_cookie(config.environment))
        .finish())
}
