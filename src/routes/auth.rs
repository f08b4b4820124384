use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::cookie::{auth_cookie, clear_auth_cookie};
use crate::auth::{
    hash_password, verify_password, AuthenticatedUser, SignInRequest, SignUpRequest, TokenIssuer,
};
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::{normalize_email, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, google_id, github_id, created_at, updated_at";

/// Register a new user.
///
/// The existence check and the insert share one transaction so two
/// concurrent sign-ups for the same email cannot both pass the check; the
/// unique index settles the race and the loser surfaces as the same
/// duplicate-email error.
#[post("/sign-up")]
pub async fn sign_up(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    config: web::Data<Config>,
    payload: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        // Dropping the transaction rolls it back.
        return Err(AppError::Conflict("Email is already in use".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let token = issuer.issue(user.id)?;
    let cookie = auth_cookie(token.clone(), config.environment, issuer.ttl_hours());

    Ok(HttpResponse::Created().cookie(cookie).json(json!({
        "success": true,
        "message": "User registered successfully",
        "data": {
            "user": user.into_public(),
            "token": token
        }
    })))
}

/// Authenticate with email and password.
///
/// Unknown email answers 404 while a wrong password answers 401. The
/// distinction is an enumeration giveaway the API has always had; clients
/// depend on it, so it stays.
#[post("/sign-in")]
pub async fn sign_in(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    config: web::Data<Config>,
    payload: web::Json<SignInRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(&email)
    .fetch_optional(&**pool)
    .await?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    // Accounts created through OAuth may have no password at all.
    let verified = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&payload.password, hash)?,
        None => false,
    };

    if !verified {
        return Err(AppError::Unauthorized("Invalid password".into()));
    }

    let token = issuer.issue(user.id)?;
    let cookie = auth_cookie(token.clone(), config.environment, issuer.ttl_hours());

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "User signed in successfully",
        "data": {
            "user": user.into_public(),
            "token": token
        }
    })))
}

/// Clear the auth cookie. Idempotent: succeeds whether or not a session
/// existed, and the token itself stays valid until expiry (statelessness is
/// a documented trade-off).
#[post("/sign-out")]
pub async fn sign_out(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(clear_auth_cookie(config.environment))
        .json(json!({
            "success": true,
            "message": "User signed out successfully"
        }))
}

/// Return the session user.
#[get("")]
pub async fn profile(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": user.into_inner()
    }))
}
