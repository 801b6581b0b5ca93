#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Trip request, coordinate, and landmark types for the fare estimator.
//!
//! These types are shared by the geocoder adapters, the feature builder,
//! and the presentation layers (CLI and HTTP server). All of them are
//! immutable once constructed; range invariants are checked by the
//! constructors so downstream code can rely on them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Errors raised when constructing trip types from untrusted input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripError {
    /// Latitude outside `[-90, 90]` or not finite.
    #[error("invalid latitude {0}: expected a finite value in [-90, 90]")]
    InvalidLatitude(f64),

    /// Longitude outside `[-180, 180]` or not finite.
    #[error("invalid longitude {0}: expected a finite value in [-180, 180]")]
    InvalidLongitude(f64),

    /// Passenger count outside the supported range.
    #[error(
        "invalid passenger count {0}: expected {min}-{max}",
        min = PassengerCount::MIN,
        max = PassengerCount::MAX
    )]
    InvalidPassengerCount(u8),
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = TripError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Creates a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`TripError::InvalidLatitude`] or
    /// [`TripError::InvalidLongitude`] if a component is out of range or
    /// not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TripError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(TripError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(TripError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Number of passengers on a trip, 1-10 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PassengerCount(u8);

impl PassengerCount {
    /// Smallest accepted passenger count.
    pub const MIN: u8 = 1;
    /// Largest accepted passenger count.
    pub const MAX: u8 = 10;

    /// Creates a passenger count.
    ///
    /// # Errors
    ///
    /// Returns [`TripError::InvalidPassengerCount`] if `value` is outside
    /// `MIN..=MAX`.
    pub const fn new(value: u8) -> Result<Self, TripError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(TripError::InvalidPassengerCount(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for PassengerCount {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for PassengerCount {
    type Error = TripError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PassengerCount> for u8 {
    fn from(count: PassengerCount) -> Self {
        count.0
    }
}

impl std::fmt::Display for PassengerCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A fully resolved trip: both endpoints geocoded, plus trip metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    /// Where the ride starts.
    pub pickup: Coordinate,
    /// Where the ride ends.
    pub dropoff: Coordinate,
    /// Number of passengers.
    pub passenger_count: PassengerCount,
    /// Local pickup date and time.
    pub date_time: NaiveDateTime,
}

/// Fixed points of interest whose proximity to the dropoff drives
/// surcharges.
///
/// Declaration order is the order in which landmark distances appear in
/// the feature vector.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Landmark {
    /// John F. Kennedy International Airport.
    Jfk,
    /// `LaGuardia` Airport.
    Lga,
    /// Newark Liberty International Airport.
    Ewr,
    /// The Metropolitan Museum of Art.
    Met,
    /// World Trade Center.
    Wtc,
}

impl Landmark {
    /// All landmarks in feature order.
    pub const ALL: [Self; 5] = [Self::Jfk, Self::Lga, Self::Ewr, Self::Met, Self::Wtc];

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jfk => "JFK Airport",
            Self::Lga => "LGA Airport",
            Self::Ewr => "EWR Airport",
            Self::Met => "Metropolitan Museum",
            Self::Wtc => "World Trade Center",
        }
    }

    /// Name of the feature holding the dropoff distance to this landmark.
    #[must_use]
    pub const fn feature_name(self) -> &'static str {
        match self {
            Self::Jfk => "jfk_drop_distance",
            Self::Lga => "lga_drop_distance",
            Self::Ewr => "ewr_drop_distance",
            Self::Met => "met_drop_distance",
            Self::Wtc => "wtc_drop_distance",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Coordinates for every [`Landmark`].
///
/// Built once at startup and passed by reference into the feature
/// builder; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkSet {
    coordinates: [Coordinate; 5],
}

impl LandmarkSet {
    /// The New York City landmark set the fare model was trained with.
    #[must_use]
    pub const fn nyc() -> Self {
        const fn at(latitude: f64, longitude: f64) -> Coordinate {
            Coordinate {
                latitude,
                longitude,
            }
        }

        Self {
            coordinates: [
                at(40.6413, -73.7781),
                at(40.7769, -73.8740),
                at(40.6895, -74.1745),
                at(40.7794, -73.9632),
                at(40.7128, -74.0135),
            ],
        }
    }

    /// Returns a copy of this set with one landmark moved.
    #[must_use]
    pub const fn with(mut self, landmark: Landmark, coordinate: Coordinate) -> Self {
        self.coordinates[landmark.index()] = coordinate;
        self
    }

    /// Coordinate of `landmark`.
    #[must_use]
    pub const fn get(&self, landmark: Landmark) -> Coordinate {
        self.coordinates[landmark.index()]
    }

    /// Iterates landmarks with their coordinates, in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Coordinate)> + '_ {
        Landmark::ALL.iter().map(|&l| (l, self.get(l)))
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self::nyc()
    }
}
