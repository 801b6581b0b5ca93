//! HTTP handler functions for the fare estimator API.

use actix_web::{HttpResponse, web};
use fare_estimator::{EstimateError, Endpoint, TripForm};
use fare_estimator_server_models::{ApiError, ApiEstimate, ApiHealth, ApiLandmark, EstimateRequest};
use fare_estimator_trip_models::PassengerCount;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/landmarks`
///
/// Lists the landmarks whose dropoff distances feed the model.
pub async fn landmarks(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiLandmark::all(state.estimator.landmarks()))
}

/// `POST /api/estimate`
///
/// Geocodes both place names and predicts the fare.
pub async fn estimate(
    state: web::Data<AppState>,
    body: web::Json<EstimateRequest>,
) -> HttpResponse {
    let body = body.into_inner();

    let passenger_count = match PassengerCount::new(body.passenger_count) {
        Ok(count) => count,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let form = TripForm {
        pickup: body.pickup,
        dropoff: body.dropoff,
        passenger_count,
        date_time: body.date_time,
    };

    match state.estimator.estimate(&form).await {
        Ok(estimate) => HttpResponse::Ok().json(ApiEstimate::new(
            estimate.trip.pickup,
            estimate.trip.dropoff,
            estimate.features,
            estimate.fare,
        )),
        Err(e @ EstimateError::LocationUnresolved { pickup, dropoff }) => {
            let unresolved = [(pickup, Endpoint::Pickup), (dropoff, Endpoint::Dropoff)]
                .into_iter()
                .filter(|(failed, _)| *failed)
                .map(|(_, endpoint)| endpoint.to_string())
                .collect();
            HttpResponse::UnprocessableEntity().json(ApiError {
                error: e.to_string(),
                unresolved,
            })
        }
        Err(e @ EstimateError::Geocoder { .. }) => {
            log::error!("{e}");
            HttpResponse::BadGateway().json(ApiError::new("Geocoding service unavailable"))
        }
        Err(e @ EstimateError::Model(_)) => {
            log::error!("{e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to predict fare"))
        }
    }
}
