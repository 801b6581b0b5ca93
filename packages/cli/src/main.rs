#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the NYC taxi fare estimator.
//!
//! With a subcommand the tool runs once and exits; without one it opens
//! an interactive form (pickup, dropoff, passengers, date, time) with the
//! same defaults as the web form.

mod interactive;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use fare_estimator::{EstimateError, Estimator, EstimatorConfig, TripForm};
use fare_estimator_trip_models::PassengerCount;

#[derive(Parser)]
#[command(name = "fare_estimator_cli", about = "NYC taxi fare estimator")]
struct Cli {
    /// Configuration file (overrides `FARE_ESTIMATOR_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the fare for a trip
    Estimate(TripArgs),
    /// Print the model input for a trip as JSON without predicting
    Features(TripArgs),
    /// List the landmarks used for dropoff distance features
    Landmarks,
    /// List the available geocoding services
    Services,
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args, Clone)]
struct TripArgs {
    /// Pickup place name
    #[arg(long, default_value = interactive::DEFAULT_PICKUP)]
    pickup: String,
    /// Dropoff place name
    #[arg(long, default_value = interactive::DEFAULT_DROPOFF)]
    dropoff: String,
    /// Number of passengers (1-10)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=10))]
    passengers: u8,
    /// Pickup date (YYYY-MM-DD)
    #[arg(long, default_value = interactive::DEFAULT_DATE)]
    date: NaiveDate,
    /// Pickup time (HH:MM)
    #[arg(long, default_value = interactive::DEFAULT_TIME, value_parser = parse_time)]
    time: NaiveTime,
}

impl TripArgs {
    fn into_form(self) -> Result<TripForm, Box<dyn std::error::Error>> {
        Ok(TripForm {
            pickup: self.pickup,
            dropoff: self.dropoff,
            passenger_count: PassengerCount::new(self.passengers)?,
            date_time: NaiveDateTime::new(self.date, self.time),
        })
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

fn load_config(path: Option<&PathBuf>) -> Result<EstimatorConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => {
            let mut config = EstimatorConfig::load(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => EstimatorConfig::from_env()?,
    })
}

/// Runs one estimate and prints it. Returns `false` when the locations
/// could not be resolved.
async fn estimate(
    estimator: &Estimator,
    form: &TripForm,
) -> Result<bool, Box<dyn std::error::Error>> {
    match estimator.estimate(form).await {
        Ok(estimate) => {
            print!("{}", render::estimate(&estimate));
            Ok(true)
        }
        Err(e @ EstimateError::LocationUnresolved { .. }) => {
            eprintln!("{e}");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn features(
    estimator: &Estimator,
    form: &TripForm,
) -> Result<bool, Box<dyn std::error::Error>> {
    match estimator.resolve_trip(form).await {
        Ok(trip) => {
            let features = estimator.features(&trip);
            println!("{}", serde_json::to_string_pretty(&features)?);
            Ok(true)
        }
        Err(e @ EstimateError::LocationUnresolved { .. }) => {
            eprintln!("{e}");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Runs the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve(
    estimator: Estimator,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (env_bind, env_port) = fare_estimator_server::bind_from_env();
    let bind = bind.unwrap_or(env_bind);
    let port = port.unwrap_or(env_port);

    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(fare_estimator_server::run_server(
            estimator, &bind, port,
        ))
    })
    .await??;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    log::debug!("Using geocoding service '{}'", config.geocoder);

    let Some(command) = cli.command else {
        let estimator = Estimator::from_config(&config)?;
        return interactive::run(estimator).await;
    };

    let resolved = match command {
        Commands::Estimate(args) => {
            let estimator = Estimator::from_config(&config)?;
            estimate(&estimator, &args.into_form()?).await?
        }
        Commands::Features(args) => {
            let estimator = Estimator::from_config(&config)?;
            features(&estimator, &args.into_form()?).await?
        }
        Commands::Landmarks => {
            print!("{}", render::landmarks(&config.landmark_set()));
            true
        }
        Commands::Services => {
            print!(
                "{}",
                render::services(
                    &fare_estimator_geocoder::service_registry::all_services(),
                    &config.services,
                    &config.geocoder,
                )
            );
            true
        }
        Commands::Serve { bind, port } => {
            let estimator = Estimator::from_config(&config)?;
            serve(estimator, bind, port).await?;
            true
        }
    };

    Ok(if resolved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
