pub mod auth;
pub mod health;
pub mod oauth;
pub mod tasks;

use actix_web::web;

use crate::auth::SessionMiddleware;

/// Mounts the `/auth` and `/tasks` services. Intended to be configured under
/// the versioned API scope (`/api/v1`).
///
/// Protected scopes are wrapped in `SessionMiddleware` here so the
/// open/protected split is visible in one place. Registration order matters
/// inside `/auth`: the named routes must precede the dynamic `{provider}`
/// pair or "profile" would be parsed as a provider name.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::sign_up)
            .service(auth::sign_in)
            .service(auth::sign_out)
            .service(
                web::scope("/profile")
                    .wrap(SessionMiddleware)
                    .service(auth::profile),
            )
            .service(oauth::start)
            .service(oauth::callback),
    )
    .service(
        web::scope("/tasks")
            .wrap(SessionMiddleware)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
