//! Pelias geocoder client for hosted instances (e.g. `geocode.earth`).
//!
//! Pelias exposes a `/v1/search` endpoint that accepts free-form text
//! queries and returns `GeoJSON` `FeatureCollection` responses. Hosted
//! instances authenticate with an `api_key` query parameter.
//!
//! See <https://github.com/pelias/documentation/blob/master/search.md>

use async_trait::async_trait;
use fare_estimator_trip_models::Coordinate;

use crate::{GeocodeError, Geocoder, checked_coordinate, qualified_query};

/// A [`Geocoder`] backed by a Pelias `/v1/search` endpoint.
pub struct PeliasGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    region: String,
}

impl PeliasGeocoder {
    /// Creates a client for the Pelias instance at `base_url`.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        region: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            region,
        }
    }
}

#[async_trait]
impl Geocoder for PeliasGeocoder {
    async fn resolve(&self, place_name: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let Some(query) = qualified_query(place_name, &self.region) else {
            return Ok(None);
        };

        log::debug!("Pelias lookup: {query}");

        let url = format!("{}/v1/search", self.base_url.trim_end_matches('/'));
        let mut req = self
            .client
            .get(&url)
            .query(&[("text", query.as_str()), ("size", "1")]);
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

/// Parses a Pelias `GeoJSON` `FeatureCollection` response.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinate>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Pelias response missing 'features' array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let coords = first
        .pointer("/geometry/coordinates")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Feature missing geometry.coordinates".to_string(),
        })?;

    if coords.len() < 2 {
        return Err(GeocodeError::Parse {
            message: "coordinates array has fewer than 2 elements".to_string(),
        });
    }

    let lng = coords[0].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "longitude is not a number".to_string(),
    })?;
    let lat = coords[1].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "latitude is not a number".to_string(),
    })?;

    if let Some(label) = first
        .pointer("/properties/label")
        .and_then(serde_json::Value::as_str)
    {
        log::debug!("Pelias matched '{label}'");
    }

    checked_coordinate(lat, lng).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pelias_feature() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-73.9665, 40.7812]
                },
                "properties": {
                    "label": "Central Park, Manhattan, New York, NY, USA",
                    "confidence": 0.95
                }
            }]
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude() - 40.7812).abs() < 1e-4);
        assert!((result.longitude() - -73.9665).abs() < 1e-4);
    }

    #[test]
    fn parses_pelias_empty() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": []
        });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_short_coordinates() {
        let body = serde_json::json!({
            "features": [{ "geometry": { "coordinates": [-73.9] } }]
        });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_missing_features() {
        let body = serde_json::json!({ "error": "unauthorized" });
        assert!(parse_response(&body).is_err());
    }

    fn local_geocoder(base_url: &str) -> PeliasGeocoder {
        PeliasGeocoder::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            format!("{base_url}/"),
            Some("k".to_string()),
            "NY US".to_string(),
        )
    }

    #[tokio::test]
    async fn sends_text_query_with_api_key() {
        let (base_url, server) = crate::test_support::respond_once(
            "200 OK",
            r#"{ "features": [{ "geometry": { "coordinates": [-73.9665, 40.7812] } }] }"#,
        )
        .await;

        let result = local_geocoder(&base_url)
            .resolve("Central  Park")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            server.await.unwrap(),
            "GET /v1/search?text=Central+Park+NY+US&size=1&api_key=k HTTP/1.1"
        );
        assert!((result.longitude() - -73.9665).abs() < 1e-9);
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let (base_url, server) =
            crate::test_support::respond_once("429 Too Many Requests", "").await;

        let result = local_geocoder(&base_url).resolve("Times Square").await;

        assert!(matches!(result, Err(GeocodeError::RateLimited)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let (base_url, server) =
            crate::test_support::respond_once("500 Internal Server Error", "").await;

        let result = local_geocoder(&base_url).resolve("Times Square").await;

        assert!(matches!(
            result,
            Err(GeocodeError::Status(status)) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.await.unwrap();
    }
}
