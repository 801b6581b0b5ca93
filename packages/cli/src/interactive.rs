//! Interactive form for the fare estimator.
//!
//! Provides a menu-driven interface using `dialoguer` so a fare can be
//! estimated without memorizing CLI flags. Fields are pre-filled with the
//! same defaults as the web form.

use std::process::ExitCode;

use chrono::{NaiveDate, NaiveDateTime};
use dialoguer::{Confirm, Input, Select};
use fare_estimator::{Estimator, TripForm};
use fare_estimator_trip_models::PassengerCount;

pub const DEFAULT_PICKUP: &str = "Times Square, New York";
pub const DEFAULT_DROPOFF: &str = "Central Park, New York";
pub const DEFAULT_DATE: &str = "2023-08-08";
pub const DEFAULT_TIME: &str = "12:00";

/// Top-level actions available in the interactive menu.
#[derive(Clone, Copy)]
enum Action {
    Estimate,
    Features,
    Landmarks,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[Self::Estimate, Self::Features, Self::Landmarks, Self::Serve];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Estimate => "Estimate a fare",
            Self::Features => "Show model features for a trip",
            Self::Landmarks => "List landmarks",
            Self::Serve => "Start API server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected operation fails.
pub async fn run(estimator: Estimator) -> Result<ExitCode, Box<dyn std::error::Error>> {
    println!("NYC Taxi Fare Calculator");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let resolved = match Action::ALL[idx] {
        Action::Estimate => loop {
            let form = prompt_form()?;
            let resolved = super::estimate(&estimator, &form).await?;
            if !Confirm::new()
                .with_prompt("Estimate another trip?")
                .default(false)
                .interact()?
            {
                break resolved;
            }
            println!();
        },
        Action::Features => {
            let form = prompt_form()?;
            super::features(&estimator, &form).await?
        }
        Action::Landmarks => {
            print!("{}", super::render::landmarks(estimator.landmarks()));
            true
        }
        Action::Serve => {
            super::serve(estimator, None, None).await?;
            true
        }
    };

    Ok(if resolved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn prompt_form() -> Result<TripForm, Box<dyn std::error::Error>> {
    let pickup: String = Input::new()
        .with_prompt("Enter Pickup Location")
        .default(DEFAULT_PICKUP.to_string())
        .interact_text()?;

    let dropoff: String = Input::new()
        .with_prompt("Enter Dropoff Location")
        .default(DEFAULT_DROPOFF.to_string())
        .interact_text()?;

    let passengers: u8 = Input::new()
        .with_prompt("Enter Passenger Count")
        .default(1)
        .validate_with(|n: &u8| -> Result<(), String> {
            PassengerCount::new(*n).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let date: String = Input::new()
        .with_prompt("Enter Date (YYYY-MM-DD)")
        .default(DEFAULT_DATE.to_string())
        .validate_with(|s: &String| -> Result<(), String> {
            s.trim()
                .parse::<NaiveDate>()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    let time: String = Input::new()
        .with_prompt("Enter Time (HH:MM)")
        .default(DEFAULT_TIME.to_string())
        .validate_with(|s: &String| -> Result<(), String> {
            super::parse_time(s).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    Ok(TripForm {
        pickup,
        dropoff,
        passenger_count: PassengerCount::new(passengers)?,
        date_time: NaiveDateTime::new(date.trim().parse()?, super::parse_time(&time)?),
    })
}
