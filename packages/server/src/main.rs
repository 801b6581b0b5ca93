#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the fare estimator API server.

use fare_estimator::{Estimator, EstimatorConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = EstimatorConfig::from_env()?;
    let estimator = Estimator::from_config(&config)?;

    let (bind_addr, port) = fare_estimator_server::bind_from_env();
    fare_estimator_server::run_server(estimator, &bind_addr, port).await?;

    Ok(())
}
