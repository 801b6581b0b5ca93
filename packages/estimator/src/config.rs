//! Application configuration.
//!
//! The configuration is a TOML document read once at startup. When
//! `FARE_ESTIMATOR_CONFIG` is unset the embedded `config/default.toml` is
//! used. A handful of environment variables override individual fields:
//!
//! | Variable | Field |
//! |---|---|
//! | `FARE_ESTIMATOR_GEOCODER` | `geocoder` |
//! | `FARE_ESTIMATOR_MODEL` | `model_path` |
//! | `GEOCODER_API_KEY` | `api_key` |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fare_estimator_geocoder::GeocoderOptions;
use fare_estimator_geocoder::service_registry::GeocodingService;
use fare_estimator_trip_models::{Coordinate, Landmark, LandmarkSet};
use serde::Deserialize;

use crate::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Immutable settings for building an [`Estimator`](crate::Estimator).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Id of the geocoding service to use.
    pub geocoder: String,
    /// Region qualifier appended to every geocoding query.
    #[serde(default = "default_region")]
    pub region: String,
    /// API key for keyed geocoding services.
    #[serde(default)]
    pub api_key: Option<String>,
    /// HTTP timeout for geocoding requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Model artifact to load. The bundled baseline model is used when
    /// unset.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Per-landmark coordinate overrides.
    #[serde(default)]
    pub landmarks: BTreeMap<Landmark, Coordinate>,
    /// Geocoding services in addition to the built-in ones.
    #[serde(default)]
    pub services: Vec<GeocodingService>,
}

fn default_region() -> String {
    fare_estimator_geocoder::DEFAULT_REGION.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::parse(DEFAULT_CONFIG)
            .unwrap_or_else(|e| panic!("Embedded default config is invalid: {e}"))
    }
}

impl EstimatorConfig {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Self::parse(&contents)
    }

    /// Loads the configuration named by `FARE_ESTIMATOR_CONFIG` (or the
    /// embedded default) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured file cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os("FARE_ESTIMATOR_CONFIG") {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(geocoder) = lookup("FARE_ESTIMATOR_GEOCODER") {
            log::debug!("Geocoder overridden by environment: {geocoder}");
            self.geocoder = geocoder;
        }
        if let Some(model) = lookup("FARE_ESTIMATOR_MODEL") {
            self.model_path = Some(PathBuf::from(model));
        }
        if let Some(key) = lookup("GEOCODER_API_KEY") {
            self.api_key = Some(key);
        }
    }

    /// Landmark set with any configured overrides applied.
    #[must_use]
    pub fn landmark_set(&self) -> LandmarkSet {
        self.landmarks
            .iter()
            .fold(LandmarkSet::nyc(), |set, (&landmark, &coordinate)| {
                set.with(landmark, coordinate)
            })
    }

    /// Options passed to the geocoder factory.
    #[must_use]
    pub fn geocoder_options(&self) -> GeocoderOptions {
        GeocoderOptions {
            region: self.region.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_parses() {
        let config = EstimatorConfig::default();
        assert_eq!(config.geocoder, "nominatim");
        assert_eq!(config.region, "NY US");
        assert_eq!(config.timeout_secs, 10);
        assert!(config.model_path.is_none());
        assert_eq!(config.landmark_set(), LandmarkSet::nyc());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = EstimatorConfig::parse(r#"geocoder = "offline""#).unwrap();
        assert_eq!(config.region, "NY US");
        assert!(config.services.is_empty());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = EstimatorConfig::parse("geocoder = \"offline\"\nregoin = \"NY\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn landmark_overrides_apply() {
        let config = EstimatorConfig::parse(
            r#"
            geocoder = "offline"

            [landmarks.wtc]
            latitude = 40.7127
            longitude = -74.0134
            "#,
        )
        .unwrap();
        let set = config.landmark_set();
        assert!((set.get(Landmark::Wtc).latitude() - 40.7127).abs() < 1e-9);
        assert_eq!(set.get(Landmark::Jfk), LandmarkSet::nyc().get(Landmark::Jfk));
    }

    #[test]
    fn invalid_landmark_coordinate_is_rejected() {
        let result = EstimatorConfig::parse(
            r#"
            geocoder = "offline"

            [landmarks.jfk]
            latitude = 140.0
            longitude = -73.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_replace_fields() {
        let mut config = EstimatorConfig::default();
        config.apply_overrides(|key| match key {
            "FARE_ESTIMATOR_GEOCODER" => Some("maps_co".to_string()),
            "FARE_ESTIMATOR_MODEL" => Some("models/gbm.json".to_string()),
            "GEOCODER_API_KEY" => Some("abc123".to_string()),
            _ => None,
        });
        assert_eq!(config.geocoder, "maps_co");
        assert_eq!(config.model_path.as_deref(), Some(Path::new("models/gbm.json")));
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut config = EstimatorConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.geocoder, "nominatim");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn geocoder_options_carry_region_and_timeout() {
        let config = EstimatorConfig::parse(
            "geocoder = \"nominatim\"\nregion = \"\"\ntimeout_secs = 3",
        )
        .unwrap();
        let options = config.geocoder_options();
        assert_eq!(options.region, "");
        assert_eq!(options.timeout, Duration::from_secs(3));
    }
}
