#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fare estimation pipeline.
//!
//! One request runs strictly in sequence:
//!
//! 1. geocode the pickup and dropoff place names
//! 2. build the feature vector from the resolved trip
//! 3. ask the predictor for a fare
//!
//! The pipeline fails closed: if either endpoint cannot be resolved no
//! distance, feature, or prediction is computed.

pub mod config;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use fare_estimator_features::{FeatureVector, build_features};
use fare_estimator_geocoder::{GeocodeError, Geocoder, build_geocoder, service_registry};
use fare_estimator_model::{FareModel, ModelError, Predictor};
use fare_estimator_trip_models::{Coordinate, LandmarkSet, PassengerCount, TripRequest};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use config::EstimatorConfig;

/// Which end of the trip a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    /// Where the ride starts.
    Pickup,
    /// Where the ride ends.
    Dropoff,
}

/// Errors surfaced by [`Estimator::estimate`].
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The geocoder had no match for one or both place names.
    #[error("Invalid location names. Please provide valid names.")]
    LocationUnresolved {
        /// Pickup had no match.
        pickup: bool,
        /// Dropoff had no match.
        dropoff: bool,
    },

    /// The geocoding service failed for an endpoint.
    #[error("Geocoding failed for {endpoint}: {source}")]
    Geocoder {
        /// Endpoint whose lookup failed.
        endpoint: Endpoint,
        /// Underlying failure.
        source: GeocodeError,
    },

    /// The predictor failed.
    #[error("Fare prediction failed: {0}")]
    Model(#[from] ModelError),
}

/// Errors from building an [`Estimator`] out of configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for the expected shape.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// `geocoder` names no known service.
    #[error("Unknown geocoding service '{0}'")]
    UnknownGeocoder(String),

    /// Geocoder could not be constructed.
    #[error(transparent)]
    Geocoder(#[from] GeocodeError),

    /// Model artifact could not be loaded.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Raw user input: place names plus trip metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripForm {
    /// Pickup place name.
    pub pickup: String,
    /// Dropoff place name.
    pub dropoff: String,
    /// Number of passengers.
    pub passenger_count: PassengerCount,
    /// Local pickup date and time.
    pub date_time: NaiveDateTime,
}

/// A completed estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// The resolved trip.
    pub trip: TripRequest,
    /// Model input derived from the trip.
    pub features: FeatureVector,
    /// Predicted fare in dollars.
    pub fare: f64,
}

/// Geocoder, predictor, and landmarks wired together.
///
/// Built once at startup and shared read-only across requests.
pub struct Estimator {
    geocoder: Box<dyn Geocoder>,
    predictor: Box<dyn Predictor>,
    landmarks: LandmarkSet,
}

impl Estimator {
    /// Wires explicit collaborators together.
    #[must_use]
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        predictor: Box<dyn Predictor>,
        landmarks: LandmarkSet,
    ) -> Self {
        Self {
            geocoder,
            predictor,
            landmarks,
        }
    }

    /// Builds the geocoder and loads the model named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the geocoding service is unknown or
    /// unusable, or the model artifact cannot be loaded.
    pub fn from_config(config: &EstimatorConfig) -> Result<Self, ConfigError> {
        let service = service_registry::find_service_in(&config.services, &config.geocoder)
            .ok_or_else(|| ConfigError::UnknownGeocoder(config.geocoder.clone()))?;
        let geocoder = build_geocoder(&service, &config.geocoder_options())?;

        let model = match &config.model_path {
            Some(path) => FareModel::load(path)?,
            None => {
                log::warn!("No model_path configured; using the bundled baseline model");
                FareModel::builtin()?
            }
        };

        log::info!(
            "Estimator ready (geocoder: {}, model: {})",
            service.id,
            model.name()
        );

        Ok(Self::new(geocoder, Box::new(model), config.landmark_set()))
    }

    /// Landmarks used for feature construction.
    #[must_use]
    pub const fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    /// Geocodes both endpoints of `form`.
    ///
    /// Both lookups are always attempted so the error can name every
    /// endpoint that failed.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Geocoder`] if a lookup failed, otherwise
    /// [`EstimateError::LocationUnresolved`] if either had no match.
    pub async fn resolve_trip(&self, form: &TripForm) -> Result<TripRequest, EstimateError> {
        let pickup = self.geocoder.resolve(&form.pickup).await;
        let dropoff = self.geocoder.resolve(&form.dropoff).await;

        let pickup = Self::checked(Endpoint::Pickup, &form.pickup, pickup)?;
        let dropoff = Self::checked(Endpoint::Dropoff, &form.dropoff, dropoff)?;

        match (pickup, dropoff) {
            (Some(pickup), Some(dropoff)) => Ok(TripRequest {
                pickup,
                dropoff,
                passenger_count: form.passenger_count,
                date_time: form.date_time,
            }),
            (pickup, dropoff) => Err(EstimateError::LocationUnresolved {
                pickup: pickup.is_none(),
                dropoff: dropoff.is_none(),
            }),
        }
    }

    fn checked(
        endpoint: Endpoint,
        place: &str,
        result: Result<Option<Coordinate>, GeocodeError>,
    ) -> Result<Option<Coordinate>, EstimateError> {
        match result {
            Ok(Some(coordinate)) => {
                log::debug!("Resolved {endpoint} '{place}' to {coordinate}");
                Ok(Some(coordinate))
            }
            Ok(None) => {
                log::info!("No geocoding match for {endpoint} '{place}'");
                Ok(None)
            }
            Err(source) => {
                log::warn!("Geocoding {endpoint} '{place}' failed: {source}");
                Err(EstimateError::Geocoder { endpoint, source })
            }
        }
    }

    /// Builds the model input for an already-resolved trip.
    #[must_use]
    pub fn features(&self, trip: &TripRequest) -> FeatureVector {
        build_features(trip, &self.landmarks)
    }

    /// Predicts the fare for an already-resolved trip.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Model`] if the predictor fails.
    pub fn estimate_trip(&self, trip: TripRequest) -> Result<Estimate, EstimateError> {
        let features = self.features(&trip);
        let fare = self.predictor.predict(&features)?;
        log::debug!(
            "Predicted ${fare:.2} for {:.2} km trip",
            features.trip_distance
        );
        Ok(Estimate {
            trip,
            features,
            fare,
        })
    }

    /// Runs the full pipeline for one form submission.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError`] if geocoding or prediction fails. The
    /// predictor is never invoked unless both endpoints resolve.
    pub async fn estimate(&self, form: &TripForm) -> Result<Estimate, EstimateError> {
        let trip = self.resolve_trip(form).await?;
        self.estimate_trip(trip)
    }
}
