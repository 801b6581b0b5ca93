//! Offline geocoder backed by a fixed table of place names.
//!
//! Names are matched after normalization (case, punctuation, and
//! whitespace are ignored), so `"Times Square, New York"` and
//! `"times square new york"` are the same key. The region qualifier is
//! not applied.

use std::collections::BTreeMap;

use async_trait::async_trait;
use fare_estimator_trip_models::Coordinate;
use serde::Deserialize;

use crate::{GeocodeError, Geocoder, checked_coordinate};

/// One known place and the names it answers to.
#[derive(Debug, Clone, Deserialize)]
pub struct GazetteerEntry {
    /// Names and aliases for the place.
    pub names: Vec<String>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// A [`Geocoder`] that answers from memory.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: BTreeMap<String, Coordinate>,
}

impl Gazetteer {
    /// Builds the lookup table.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Config`] if an entry has invalid
    /// coordinates.
    pub fn from_entries(entries: &[GazetteerEntry]) -> Result<Self, GeocodeError> {
        let mut places = BTreeMap::new();
        for entry in entries {
            let coordinate = checked_coordinate(entry.latitude, entry.longitude).map_err(|e| {
                GeocodeError::Config {
                    message: format!("gazetteer entry {:?}: {e}", entry.names),
                }
            })?;
            for name in &entry.names {
                places.insert(normalize(name), coordinate);
            }
        }
        Ok(Self { places })
    }

    /// Adds or replaces a single name.
    #[must_use]
    pub fn with_place(mut self, name: &str, coordinate: Coordinate) -> Self {
        self.places.insert(normalize(name), coordinate);
        self
    }

    /// Synchronous lookup.
    #[must_use]
    pub fn lookup(&self, place_name: &str) -> Option<Coordinate> {
        self.places.get(&normalize(place_name)).copied()
    }
}

#[async_trait]
impl Geocoder for Gazetteer {
    async fn resolve(&self, place_name: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self.lookup(place_name))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
