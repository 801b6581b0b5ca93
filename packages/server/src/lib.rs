#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the fare estimator.
//!
//! Exposes the estimation pipeline as a small JSON API:
//!
//! - `GET /api/health`
//! - `GET /api/landmarks`
//! - `POST /api/estimate`

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use fare_estimator::Estimator;

/// Shared application state.
pub struct AppState {
    /// The estimation pipeline, built once at startup.
    pub estimator: Arc<Estimator>,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/landmarks", web::get().to(handlers::landmarks))
            .route("/estimate", web::post().to(handlers::estimate)),
    );
}

/// Reads `BIND_ADDR` and `PORT`, defaulting to `127.0.0.1:8080`.
#[must_use]
pub fn bind_from_env() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    (bind_addr, port)
}

/// Starts the fare estimator API server.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(estimator: Estimator, bind_addr: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        estimator: Arc::new(estimator),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
