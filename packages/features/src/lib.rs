#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Feature engineering for the taxi fare model.
//!
//! Turns a resolved [`TripRequest`] into the fixed 17-field
//! [`FeatureVector`] the fare model was trained on:
//!
//! - raw pickup/dropoff coordinates and passenger count
//! - geodesic trip distance (WGS84 ellipsoid, kilometers)
//! - calendar fields: year, month, day, day of week, week of year, hour
//! - geodesic distance from the **dropoff** to each [`Landmark`]
//!
//! Field names and order are the contract with the model artifact. The
//! calendar conventions are load-bearing: day of week counts from
//! Monday = 0 and week of year uses Sunday-start numbering (`%U`), where
//! days before the first Sunday of the year fall in week 0.

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};
use fare_estimator_trip_models::{Coordinate, Landmark, LandmarkSet, TripRequest};
use geo::{Distance as _, Geodesic, Point};
use serde::Serialize;

/// Number of fields in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 17;

/// Feature names in the order the model expects them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
    "passenger_count",
    "trip_distance",
    "year",
    "month",
    "day",
    "day_of_week",
    "week_of_year",
    "hour",
    "jfk_drop_distance",
    "lga_drop_distance",
    "ewr_drop_distance",
    "met_drop_distance",
    "wtc_drop_distance",
];

/// Geodesic distance between two coordinates in kilometers.
///
/// Uses Karney's algorithm on the WGS84 ellipsoid, so results agree with
/// other geodesic libraries to within their rounding.
#[must_use]
pub fn geodesic_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    Geodesic.distance(to_point(a), to_point(b)) / 1000.0
}

fn to_point(c: Coordinate) -> Point<f64> {
    Point::new(c.longitude(), c.latitude())
}

/// Calendar fields extracted from a pickup date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    /// Calendar year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Day of week, Monday = 0 through Sunday = 6.
    pub day_of_week: u32,
    /// Sunday-start week of year, 0-53.
    pub week_of_year: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
}

impl CalendarFields {
    /// Decomposes `date_time` into model calendar fields.
    #[must_use]
    pub fn from_date_time(date_time: NaiveDateTime) -> Self {
        let weekday = date_time.weekday();
        Self {
            year: date_time.year(),
            month: date_time.month(),
            day: date_time.day(),
            day_of_week: weekday.num_days_from_monday(),
            week_of_year: (date_time.ordinal0() + 7 - weekday.num_days_from_sunday()) / 7,
            hour: date_time.hour(),
        }
    }
}

/// The model input for a single trip.
///
/// Serializes as a JSON object whose keys appear in [`FEATURE_NAMES`]
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: u8,
    /// Pickup to dropoff, kilometers.
    pub trip_distance: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_of_week: u32,
    pub week_of_year: u32,
    pub hour: u32,
    pub jfk_drop_distance: f64,
    pub lga_drop_distance: f64,
    pub ewr_drop_distance: f64,
    pub met_drop_distance: f64,
    pub wtc_drop_distance: f64,
}

impl FeatureVector {
    /// Number of fields. Always [`FEATURE_COUNT`].
    #[must_use]
    pub const fn len(&self) -> usize {
        FEATURE_COUNT
    }

    /// Always `false`; present to pair with [`Self::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Values in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pickup_longitude,
            self.pickup_latitude,
            self.dropoff_longitude,
            self.dropoff_latitude,
            f64::from(self.passenger_count),
            self.trip_distance,
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
            f64::from(self.day_of_week),
            f64::from(self.week_of_year),
            f64::from(self.hour),
            self.jfk_drop_distance,
            self.lga_drop_distance,
            self.ewr_drop_distance,
            self.met_drop_distance,
            self.wtc_drop_distance,
        ]
    }

    /// Iterates `(name, value)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }

    /// Dropoff distance to `landmark`, kilometers.
    #[must_use]
    pub const fn landmark_distance(&self, landmark: Landmark) -> f64 {
        match landmark {
            Landmark::Jfk => self.jfk_drop_distance,
            Landmark::Lga => self.lga_drop_distance,
            Landmark::Ewr => self.ewr_drop_distance,
            Landmark::Met => self.met_drop_distance,
            Landmark::Wtc => self.wtc_drop_distance,
        }
    }
}

/// Builds the model input for `trip`.
///
/// Landmark distances are always measured from the dropoff: surcharges
/// depend on where the ride ends.
#[must_use]
pub fn build_features(trip: &TripRequest, landmarks: &LandmarkSet) -> FeatureVector {
    let TripRequest {
        pickup,
        dropoff,
        passenger_count,
        date_time,
    } = *trip;

    let calendar = CalendarFields::from_date_time(date_time);
    let drop_distance = |landmark| geodesic_distance_km(dropoff, landmarks.get(landmark));

    FeatureVector {
        pickup_longitude: pickup.longitude(),
        pickup_latitude: pickup.latitude(),
        dropoff_longitude: dropoff.longitude(),
        dropoff_latitude: dropoff.latitude(),
        passenger_count: passenger_count.value(),
        trip_distance: geodesic_distance_km(pickup, dropoff),
        year: calendar.year,
        month: calendar.month,
        day: calendar.day,
        day_of_week: calendar.day_of_week,
        week_of_year: calendar.week_of_year,
        hour: calendar.hour,
        jfk_drop_distance: drop_distance(Landmark::Jfk),
        lga_drop_distance: drop_distance(Landmark::Lga),
        ewr_drop_distance: drop_distance(Landmark::Ewr),
        met_drop_distance: drop_distance(Landmark::Met),
        wtc_drop_distance: drop_distance(Landmark::Wtc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use fare_estimator_trip_models::PassengerCount;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn times_square() -> Coordinate {
        coord(40.7580, -73.9855)
    }

    fn central_park() -> Coordinate {
        coord(40.7812, -73.9665)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    fn sample_trip() -> TripRequest {
        TripRequest {
            pickup: times_square(),
            dropoff: central_park(),
            passenger_count: PassengerCount::new(2).unwrap(),
            date_time: at(2023, 8, 8, 12, 0),
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (times_square(), central_park()),
            (coord(0.0, 0.0), coord(-33.8688, 151.2093)),
            (coord(89.9, 10.0), coord(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            let ab = geodesic_distance_km(a, b);
            let ba = geodesic_distance_km(b, a);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for c in [times_square(), coord(0.0, 0.0), coord(-45.0, 179.5)] {
            assert!(geodesic_distance_km(c, c).abs() < 1e-12);
        }
    }

    #[test]
    fn times_square_to_central_park_golden_distance() {
        let d = geodesic_distance_km(times_square(), central_park());
        assert!((2.9..=3.1).contains(&d), "unexpected distance {d}");
    }

    #[test]
    fn distance_uses_ellipsoid() {
        // One degree of latitude at the equator is ~110.574 km on WGS84
        // versus ~111.195 km on a 6371 km sphere.
        let d = geodesic_distance_km(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 110.574).abs() < 0.01, "unexpected distance {d}");
    }

    #[test]
    fn calendar_fields_for_reference_date() {
        let fields = CalendarFields::from_date_time(at(2023, 8, 8, 12, 0));
        assert_eq!(
            fields,
            CalendarFields {
                year: 2023,
                month: 8,
                day: 8,
                // Tuesday, Monday = 0
                day_of_week: 1,
                week_of_year: 32,
                hour: 12,
            }
        );
    }

    #[test]
    fn week_of_year_is_sunday_start() {
        // 2022-01-01 is a Saturday, before the first Sunday
        assert_eq!(
            CalendarFields::from_date_time(at(2022, 1, 1, 0, 0)).week_of_year,
            0
        );
        assert_eq!(
            CalendarFields::from_date_time(at(2022, 1, 2, 0, 0)).week_of_year,
            1
        );
        // 2023-01-01 is a Sunday; ISO would call it week 52 of 2022
        assert_eq!(
            CalendarFields::from_date_time(at(2023, 1, 1, 0, 0)).week_of_year,
            1
        );
        assert_eq!(
            CalendarFields::from_date_time(at(2023, 12, 31, 23, 59)).week_of_year,
            53
        );
    }

    #[test]
    fn week_of_year_agrees_with_strftime_u() {
        let mut day = NaiveDate::from_ymd_opt(2019, 12, 25).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        while day <= end {
            let dt = day.and_hms_opt(6, 0, 0).unwrap();
            let expected: u32 = dt.format("%U").to_string().parse().unwrap();
            assert_eq!(
                CalendarFields::from_date_time(dt).week_of_year,
                expected,
                "mismatch on {day}"
            );
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn day_of_week_counts_from_monday() {
        // 2023-08-07 Monday .. 2023-08-13 Sunday
        for offset in 0..7 {
            let fields = CalendarFields::from_date_time(at(2023, 8, 7 + offset, 9, 30));
            assert_eq!(fields.day_of_week, offset);
        }
    }

    #[test]
    fn build_features_populates_all_fields() {
        let trip = sample_trip();
        let features = build_features(&trip, &LandmarkSet::nyc());

        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features.to_array().len(), 17);
        assert!((features.pickup_latitude - 40.7580).abs() < 1e-12);
        assert!((features.dropoff_longitude - -73.9665).abs() < 1e-12);
        assert_eq!(features.passenger_count, 2);
        assert_eq!(features.year, 2023);
        assert_eq!(features.week_of_year, 32);
        assert!((2.9..=3.1).contains(&features.trip_distance));
    }

    #[test]
    fn landmark_distances_measured_from_dropoff() {
        let landmarks = LandmarkSet::nyc();
        let trip = sample_trip();
        let features = build_features(&trip, &landmarks);

        for (landmark, at) in landmarks.iter() {
            let from_dropoff = geodesic_distance_km(trip.dropoff, at);
            assert!((features.landmark_distance(landmark) - from_dropoff).abs() < 1e-12);
        }

        // The Met is right next to the Central Park dropoff
        assert!(features.met_drop_distance < 0.5);
    }

    #[test]
    fn dropoff_on_landmark_gives_zero_distance() {
        let landmarks = LandmarkSet::nyc();
        let mut trip = sample_trip();
        trip.dropoff = landmarks.get(Landmark::Jfk);
        let features = build_features(&trip, &landmarks);
        assert!(features.jfk_drop_distance.abs() < 1e-9);
    }

    #[test]
    fn iter_yields_names_in_model_order() {
        let features = build_features(&sample_trip(), &LandmarkSet::nyc());
        let names: Vec<&str> = features.iter().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
        let (name, value) = features.iter().nth(4).unwrap();
        assert_eq!(name, "passenger_count");
        assert!((value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn landmark_feature_names_match_schema() {
        for (i, landmark) in Landmark::ALL.iter().enumerate() {
            assert_eq!(FEATURE_NAMES[12 + i], landmark.feature_name());
        }
    }

    #[test]
    fn serializes_with_schema_key_order() {
        let features = build_features(&sample_trip(), &LandmarkSet::nyc());
        let json = serde_json::to_string(&features).unwrap();
        let mut last = 0;
        for name in FEATURE_NAMES {
            let pos = json.find(&format!("\"{name}\"")).unwrap();
            assert!(pos >= last, "{name} out of order");
            last = pos;
        }
    }
}
