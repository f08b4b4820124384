use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskforge::auth::TokenIssuer;
use taskforge::config::Config;
use taskforge::routes::{self, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    // Bounded acquire timeout: a storage outage fails requests with a 500
    // instead of hanging them.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let issuer = TokenIssuer::from_config(&config);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    log::info!("Starting TaskForge server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);

    let app_config = web::Data::new(config);
    let app_pool = web::Data::new(pool.clone());
    let app_issuer = web::Data::new(issuer);
    let app_http = web::Data::new(http_client);

    HttpServer::new(move || {
        // The auth cookie only crosses origins when the browser is told the
        // exact frontend origin and credentials are allowed.
        let cors = Cors::default()
            .allowed_origin(&app_config.frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(app_config.clone())
            .app_data(app_pool.clone())
            .app_data(app_issuer.clone())
            .app_data(app_http.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(health::index)
            .service(health::health)
            .service(web::scope("/api/v1").configure(routes::config))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    // Storage handle lifecycle: opened at startup, closed here on shutdown.
    pool.close().await;

    Ok(())
}
