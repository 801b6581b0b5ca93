//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Works against the public OSM instance and against Nominatim-compatible
//! hosts such as `geocode.maps.co`, which accept the same `/search` query
//! and additionally take an `api_key` parameter.
//!
//! The public instance allows **1 request per second**; the adapter
//! enforces the configured minimum spacing between requests itself.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use fare_estimator_trip_models::Coordinate;

use crate::rate_limit::RateLimiter;
use crate::{GeocodeError, Geocoder, checked_coordinate, qualified_query};

/// A [`Geocoder`] backed by a Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    region: String,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    /// Creates a client for the endpoint at `base_url`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        region: String,
        min_interval: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            region,
            limiter: RateLimiter::new(min_interval),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place_name: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let Some(query) = qualified_query(place_name, &self.region) else {
            return Ok(None);
        };

        self.limiter.wait().await;

        log::debug!("Nominatim lookup: {query}");

        let mut req = self.client.get(&self.base_url).query(&[
            ("q", query.as_str()),
            ("format", "jsonv2"),
            ("limit", "1"),
        ]);
        if let Some(key) = &self.api_key {
            req = req.query(&[("api_key", key)]);
        }

        let resp = req.send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(GeocodeError::Status(resp.status()));
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = parse_degrees(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lon = parse_degrees(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    if let Some(name) = first["display_name"].as_str() {
        log::debug!("Nominatim matched '{name}'");
    }

    checked_coordinate(lat, lon).map(Some)
}

/// Nominatim encodes degrees as strings; some compatible hosts use numbers.
fn parse_degrees(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "40.7579747",
            "lon": "-73.9855426",
            "display_name": "Times Square, Manhattan, New York, NY, USA"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude() - 40.757_974_7).abs() < 1e-7);
        assert!((result.longitude() - -73.985_542_6).abs() < 1e-7);
    }

    #[test]
    fn parses_numeric_degrees() {
        let body = serde_json::json!([{ "lat": 40.78, "lon": -73.96 }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude() - 40.78).abs() < 1e-9);
    }

    #[test]
    fn uses_first_result_only() {
        let body = serde_json::json!([
            { "lat": "1.0", "lon": "2.0" },
            { "lat": "3.0", "lon": "4.0" }
        ]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_missing_or_invalid_lat() {
        let missing = serde_json::json!([{ "lon": "-73.9" }]);
        assert!(parse_response(&missing).is_err());

        let out_of_range = serde_json::json!([{ "lat": "95.0", "lon": "-73.9" }]);
        assert!(parse_response(&out_of_range).is_err());
    }

    #[tokio::test]
    async fn blank_place_resolves_to_none_without_request() {
        // Unroutable base URL: a request would fail with an HTTP error.
        let geocoder = NominatimGeocoder::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/search".to_string(),
            None,
            "NY US".to_string(),
            Duration::ZERO,
        );
        assert!(geocoder.resolve("   ").await.unwrap().is_none());
    }

    fn local_geocoder(base_url: &str, api_key: Option<&str>) -> NominatimGeocoder {
        NominatimGeocoder::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            format!("{base_url}/search"),
            api_key.map(String::from),
            "NY US".to_string(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn sends_qualified_query_with_api_key() {
        let (base_url, server) = crate::test_support::respond_once(
            "200 OK",
            r#"[{ "lat": "40.758", "lon": "-73.9855" }]"#,
        )
        .await;

        let result = local_geocoder(&base_url, Some("k"))
            .resolve("Times Square")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            server.await.unwrap(),
            "GET /search?q=Times+Square+NY+US&format=jsonv2&limit=1&api_key=k HTTP/1.1"
        );
        assert!((result.latitude() - 40.758).abs() < 1e-9);
    }

    #[tokio::test]
    async fn omits_api_key_when_unset() {
        let (base_url, server) = crate::test_support::respond_once("200 OK", "[]").await;

        let result = local_geocoder(&base_url, None)
            .resolve("Central Park")
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(
            server.await.unwrap(),
            "GET /search?q=Central+Park+NY+US&format=jsonv2&limit=1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let (base_url, server) =
            crate::test_support::respond_once("429 Too Many Requests", "").await;

        let result = local_geocoder(&base_url, None).resolve("Times Square").await;

        assert!(matches!(result, Err(GeocodeError::RateLimited)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let (base_url, server) =
            crate::test_support::respond_once("500 Internal Server Error", "").await;

        let result = local_geocoder(&base_url, None).resolve("Times Square").await;

        assert!(matches!(
            result,
            Err(GeocodeError::Status(status)) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.await.unwrap();
    }
}
