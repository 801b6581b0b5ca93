#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fare estimator server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline types to allow independent evolution of the API
//! contract.

use chrono::NaiveDateTime;
use fare_estimator_features::FeatureVector;
use fare_estimator_trip_models::{Coordinate, Landmark, LandmarkSet};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Always `true` when the server is answering.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Body of `POST /api/estimate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    /// Pickup place name.
    pub pickup: String,
    /// Dropoff place name.
    pub dropoff: String,
    /// Number of passengers (1-10).
    #[serde(default = "default_passengers")]
    pub passenger_count: u8,
    /// Local pickup date and time (`YYYY-MM-DDTHH:MM:SS`).
    pub date_time: NaiveDateTime,
}

const fn default_passengers() -> u8 {
    1
}

/// A coordinate as returned by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApiCoordinate {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl From<Coordinate> for ApiCoordinate {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude(),
            longitude: c.longitude(),
        }
    }
}

/// A landmark and its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLandmark {
    /// Landmark id (e.g. `"jfk"`).
    pub id: Landmark,
    /// Display name.
    pub name: String,
    /// Position.
    #[serde(flatten)]
    pub coordinate: ApiCoordinate,
}

impl ApiLandmark {
    /// Lists every landmark in `set`, in feature order.
    #[must_use]
    pub fn all(set: &LandmarkSet) -> Vec<Self> {
        set.iter()
            .map(|(landmark, coordinate)| Self {
                id: landmark,
                name: landmark.label().to_string(),
                coordinate: coordinate.into(),
            })
            .collect()
    }
}

/// Dropoff distance to one landmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLandmarkDistance {
    /// Landmark id.
    pub id: Landmark,
    /// Display name.
    pub name: String,
    /// Distance from the dropoff, kilometers.
    pub distance_km: f64,
}

/// Successful response of `POST /api/estimate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEstimate {
    /// Resolved pickup.
    pub pickup: ApiCoordinate,
    /// Resolved dropoff.
    pub dropoff: ApiCoordinate,
    /// Pickup to dropoff, kilometers.
    pub trip_distance_km: f64,
    /// Dropoff distance to each landmark.
    pub landmark_distances: Vec<ApiLandmarkDistance>,
    /// Exact model input, keyed by feature name.
    pub features: FeatureVector,
    /// Predicted fare in dollars, rounded to cents.
    pub fare: f64,
}

impl ApiEstimate {
    /// Builds the response from pipeline outputs.
    #[must_use]
    pub fn new(pickup: Coordinate, dropoff: Coordinate, features: FeatureVector, fare: f64) -> Self {
        let landmark_distances = Landmark::ALL
            .iter()
            .map(|&landmark| ApiLandmarkDistance {
                id: landmark,
                name: landmark.label().to_string(),
                distance_km: features.landmark_distance(landmark),
            })
            .collect();

        Self {
            pickup: pickup.into(),
            dropoff: dropoff.into(),
            trip_distance_km: features.trip_distance,
            landmark_distances,
            features,
            fare: (fare * 100.0).round() / 100.0,
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Endpoints that could not be resolved, when applicable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl ApiError {
    /// Error with a message only.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            unresolved: Vec::new(),
        }
    }
}
