#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place-name geocoding for the fare estimator.
//!
//! Every provider implements the single-method [`Geocoder`] trait, so the
//! estimator never sees provider-specific response shapes:
//!
//! 1. **Nominatim**: the public `OpenStreetMap` instance (free, 1 req/sec)
//!    or any Nominatim-compatible host such as `geocode.maps.co` (keyed).
//! 2. **Pelias**: a hosted Pelias API such as `geocode.earth` (keyed).
//! 3. **Gazetteer**: a fixed table of place names, for offline use.
//!
//! Provider configurations are TOML documents loaded from the
//! [`service_registry`]; [`build_geocoder`] turns one into a boxed
//! [`Geocoder`].

pub mod gazetteer;
pub mod nominatim;
pub mod pelias;
pub mod rate_limit;
pub mod service_registry;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use async_trait::async_trait;
use fare_estimator_trip_models::Coordinate;
use thiserror::Error;

use crate::service_registry::{GeocodingService, ProviderConfig};

/// Default region qualifier appended to every query.
pub const DEFAULT_REGION: &str = "NY US";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves a free-text place name to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up `place_name`.
    ///
    /// Returns `Ok(None)` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider could not be reached or
    /// returned a response that could not be understood.
    async fn resolve(&self, place_name: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Geocoder returned status {0}")]
    Status(reqwest::StatusCode),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider configuration is unusable.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
    },
}

/// Settings shared by all providers, independent of the provider config.
#[derive(Debug, Clone)]
pub struct GeocoderOptions {
    /// Appended to every query (e.g. `"NY US"`). Empty to disable.
    pub region: String,
    /// Overrides the API key from the provider config.
    pub api_key: Option<String>,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for GeocoderOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Builds the query string sent to a provider.
///
/// Collapses whitespace in `place_name` and appends `region`. Returns
/// `None` for a blank place name.
#[must_use]
pub fn qualified_query(place_name: &str, region: &str) -> Option<String> {
    let place = place_name.split_whitespace().collect::<Vec<_>>().join(" ");
    if place.is_empty() {
        return None;
    }

    let region = region.trim();
    if region.is_empty() {
        Some(place)
    } else {
        Some(format!("{place} {region}"))
    }
}

/// Validates provider-supplied coordinates.
fn checked_coordinate(latitude: f64, longitude: f64) -> Result<Coordinate, GeocodeError> {
    Coordinate::new(latitude, longitude).map_err(|e| GeocodeError::Parse {
        message: e.to_string(),
    })
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fare_estimator/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Instantiates the provider described by `service`.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the provider requires an API key
/// and none is configured, or [`GeocodeError::Http`] if the HTTP client
/// cannot be built.
pub fn build_geocoder(
    service: &GeocodingService,
    options: &GeocoderOptions,
) -> Result<Box<dyn Geocoder>, GeocodeError> {
    let api_key = options
        .api_key
        .clone()
        .or_else(|| service.provider.api_key().map(String::from))
        .filter(|k| !k.is_empty());

    if service.provider.requires_api_key() && api_key.is_none() {
        return Err(GeocodeError::Config {
            message: format!("Geocoding service '{}' requires an API key", service.id),
        });
    }

    log::debug!("Using geocoding service '{}' ({})", service.id, service.name);

    let geocoder: Box<dyn Geocoder> = match &service.provider {
        ProviderConfig::Nominatim {
            base_url,
            rate_limit_ms,
            ..
        } => Box::new(nominatim::NominatimGeocoder::new(
            http_client(options.timeout)?,
            base_url.clone(),
            api_key,
            options.region.clone(),
            Duration::from_millis(*rate_limit_ms),
        )),
        ProviderConfig::Pelias { base_url, .. } => Box::new(pelias::PeliasGeocoder::new(
            http_client(options.timeout)?,
            base_url.clone(),
            api_key,
            options.region.clone(),
        )),
        ProviderConfig::Gazetteer { places } => {
            Box::new(gazetteer::Gazetteer::from_entries(places)?)
        }
    };

    Ok(geocoder)
}
