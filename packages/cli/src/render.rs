//! Plain-text output for estimates and listings.

use fare_estimator::Estimate;
use fare_estimator_geocoder::service_registry::{GeocodingService, ProviderConfig};
use fare_estimator_trip_models::{Landmark, LandmarkSet};

/// Formats a completed estimate the way the web form shows it.
pub fn estimate(estimate: &Estimate) -> String {
    let features = &estimate.features;

    let mut lines = vec![
        format!("Pickup Coordinates: {}", estimate.trip.pickup),
        format!("Dropoff Coordinates: {}", estimate.trip.dropoff),
        format!("Trip Distance: {:.2} km", features.trip_distance),
        String::new(),
    ];
    lines.extend(Landmark::ALL.iter().map(|&landmark| {
        format!(
            "Distance to {}: {:.2} km",
            landmark.label(),
            features.landmark_distance(landmark)
        )
    }));
    lines.push(String::new());
    lines.push(format!("Predicted Fare Amount: ${:.2}", estimate.fare));

    join_lines(lines)
}

/// Lists landmarks with their coordinates.
pub fn landmarks(set: &LandmarkSet) -> String {
    join_lines(set.iter().map(|(landmark, coordinate)| {
        format!(
            "{:<4} {:<20} {}",
            landmark.as_ref(),
            landmark.label(),
            coordinate
        )
    }))
}

/// Lists geocoding services, marking the active one.
///
/// Configured services shadow built-in services with the same id.
pub fn services(built_in: &[GeocodingService], extra: &[GeocodingService], active: &str) -> String {
    let shadowed = |id: &str| extra.iter().any(|s| s.id == id);

    join_lines(
        extra
            .iter()
            .chain(built_in.iter().filter(|s| !shadowed(&s.id)))
            .map(|service| {
                let marker = if service.id == active { '*' } else { ' ' };
                let kind = match service.provider {
                    ProviderConfig::Nominatim { .. } => "nominatim",
                    ProviderConfig::Pelias { .. } => "pelias",
                    ProviderConfig::Gazetteer { .. } => "gazetteer",
                };
                let keyed = if service.provider.requires_api_key() {
                    " (API key)"
                } else {
                    ""
                };
                format!(
                    "{marker} {:<14} {:<10} {}{keyed}",
                    service.id, kind, service.name
                )
            }),
    )
}

fn join_lines(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fare_estimator_features::build_features;
    use fare_estimator_trip_models::{Coordinate, PassengerCount, TripRequest};

    use super::*;

    fn sample() -> Estimate {
        let trip = TripRequest {
            pickup: Coordinate::new(40.758, -73.9855).unwrap(),
            dropoff: Coordinate::new(40.7812, -73.9665).unwrap(),
            passenger_count: PassengerCount::default(),
            date_time: NaiveDate::from_ymd_opt(2023, 8, 8)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        };
        Estimate {
            trip,
            features: build_features(&trip, &LandmarkSet::nyc()),
            fare: 12.346,
        }
    }

    #[test]
    fn estimate_shows_coordinates_distances_and_fare() {
        let text = estimate(&sample());
        assert!(text.contains("Pickup Coordinates: (40.758, -73.9855)"));
        assert!(text.contains("Dropoff Coordinates: (40.7812, -73.9665)"));
        assert!(text.contains("Trip Distance: 3.0"));
        assert!(text.contains("Distance to JFK Airport: "));
        assert!(text.contains("Distance to World Trade Center: "));
        assert!(text.ends_with("Predicted Fare Amount: $12.35\n"));
    }

    #[test]
    fn landmarks_lists_all_five() {
        let text = landmarks(&LandmarkSet::nyc());
        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("jfk "));
    }

    #[test]
    fn services_marks_active() {
        let built_in = fare_estimator_geocoder::service_registry::all_services();
        let text = services(&built_in, &[], "offline");
        let active: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].contains("offline"));
        assert!(text.contains("(API key)"));
    }

    #[test]
    fn configured_service_shadows_built_in() {
        let built_in = fare_estimator_geocoder::service_registry::all_services();
        let custom: GeocodingService = toml::de::from_str(
            r#"
            id = "nominatim"
            name = "Self-hosted"

            [provider]
            type = "nominatim"
            base_url = "http://localhost:8080/search"
            "#,
        )
        .unwrap();

        let text = services(&built_in, &[custom], "nominatim");
        let active: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].ends_with("Self-hosted"));
        assert_eq!(text.lines().count(), built_in.len());
    }
}
