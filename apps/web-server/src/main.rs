//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;
mod templates;
mod urls;

use config::AppConfig;
use middleware::request_id::request_id;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    // Fail at startup rather than on the first request
    templates::init().map_err(|e| {
        tracing::error!(error = %e, "Failed to load templates");
        std::io::Error::other(e)
    })?;

    tracing::info!("Starting Yatube on {}:{}", config.host, config.port);

    let state = web::Data::new(AppState::new(&config).await);

    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(request_id))
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
