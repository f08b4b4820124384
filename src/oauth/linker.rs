//! Account linking: resolving an asserted provider profile to a credential
//! store entry.
//!
//! Resolution order matters:
//! 1. the provider id is authoritative; a hit needs no further checks;
//! 2. an email match merges the OAuth login into the existing account by
//!    attaching the provider id (the provider is trusted to have verified
//!    the address; an accepted trust boundary);
//! 3. otherwise a new password-less account is created.
//!
//! Step 2 is a read-then-write without a transaction: two concurrent first
//! logins for the same unlinked email converge on the same end state
//! whichever wins, so last-writer-wins is fine there.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::{normalize_email, User};
use crate::oauth::provider::{Provider, ProviderProfile};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, google_id, github_id, created_at, updated_at";

pub async fn resolve_profile(
    pool: &PgPool,
    provider: Provider,
    profile: &ProviderProfile,
) -> Result<User, AppError> {
    // id_column() is a static identifier, never request data; values are
    // always bound.
    let by_provider_id = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE {} = $1",
        USER_COLUMNS,
        provider.id_column()
    ))
    .bind(&profile.provider_id)
    .fetch_optional(pool)
    .await?;

    if let Some(user) = by_provider_id {
        return Ok(user);
    }

    if let Some(email) = &profile.email {
        let linked = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET {} = $1, updated_at = now() WHERE email = $2 RETURNING {}",
            provider.id_column(),
            USER_COLUMNS
        ))
        .bind(&profile.provider_id)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        if let Some(user) = linked {
            log::info!(
                "linked {} account to existing user {}",
                provider,
                user.id
            );
            return Ok(user);
        }
    }

    let created = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, {}) VALUES ($1, $2, $3) RETURNING {}",
        provider.id_column(),
        USER_COLUMNS
    ))
    .bind(&profile.display_name)
    .bind(profile.email.as_deref().map(normalize_email))
    .bind(&profile.provider_id)
    .fetch_one(pool)
    .await?;

    log::info!("created user {} from {} profile", created.id, provider);
    Ok(created)
}
