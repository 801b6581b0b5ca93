//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`find_service`]. Additional services can be
//! declared in the application config and looked up with
//! [`find_service_in`].

use serde::Deserialize;

use crate::gazetteer::GazetteerEntry;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`, `"maps_co"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim-compatible `/search` endpoint.
    Nominatim {
        /// Search URL (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// Minimum delay between requests in milliseconds.
        #[serde(default)]
        rate_limit_ms: u64,
        /// API key sent as the `api_key` query parameter.
        #[serde(default)]
        api_key: Option<String>,
        /// Whether requests without a key are rejected by the host.
        #[serde(default)]
        requires_api_key: bool,
    },
    /// Hosted Pelias API.
    Pelias {
        /// API base URL (e.g., `"https://api.geocode.earth"`).
        base_url: String,
        /// API key sent as the `api_key` query parameter.
        #[serde(default)]
        api_key: Option<String>,
        /// Whether requests without a key are rejected by the host.
        #[serde(default = "default_true")]
        requires_api_key: bool,
    },
    /// Fixed table of known places; no network access.
    Gazetteer {
        /// Known places.
        places: Vec<GazetteerEntry>,
    },
}

const fn default_true() -> bool {
    true
}

impl ProviderConfig {
    /// API key from the configuration, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Nominatim { api_key, .. } | Self::Pelias { api_key, .. } => api_key.as_deref(),
            Self::Gazetteer { .. } => None,
        }
    }

    /// Whether the provider refuses unauthenticated requests.
    #[must_use]
    pub const fn requires_api_key(&self) -> bool {
        match self {
            Self::Nominatim {
                requires_api_key, ..
            }
            | Self::Pelias {
                requires_api_key, ..
            } => *requires_api_key,
            Self::Gazetteer { .. } => false,
        }
    }
}

impl GeocodingService {
    /// Returns the provider's base URL regardless of variant.
    ///
    /// Returns an empty string for providers without a base URL (e.g.,
    /// `Gazetteer`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } | ProviderConfig::Pelias { base_url, .. } => {
                base_url
            }
            ProviderConfig::Gazetteer { .. } => "",
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("maps_co", include_str!("../services/maps_co.toml")),
    ("geocode_earth", include_str!("../services/geocode_earth.toml")),
    ("offline", include_str!("../services/offline.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 4;

/// Returns all built-in geocoding service configurations.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Looks up a built-in service by id.
#[must_use]
pub fn find_service(id: &str) -> Option<GeocodingService> {
    all_services().into_iter().find(|s| s.id == id)
}

/// Looks up `id` among `extra` first, then the built-in services.
#[must_use]
pub fn find_service_in(extra: &[GeocodingService], id: &str) -> Option<GeocodingService> {
    extra
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .or_else(|| find_service(id))
}
