//! HTTP surface: one weather lookup endpoint plus JSON 404/405 fallbacks.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use weather_core::{WeatherError, WeatherService, WeatherSummary};

use crate::{
    envelope::ResponseEnvelope,
    error::{ApiError, BLANK_CITY, MISSING_CITY},
};

pub const SUCCESS_MESSAGE: &str = "Successfully fetched weather data";

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

/// GET /api/v1/weather?city=<name>
async fn get_weather(
    State(service): State<Arc<WeatherService>>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<ResponseEnvelope<WeatherSummary>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let city = query
        .city
        .ok_or_else(|| WeatherError::InvalidInput(MISSING_CITY.to_string()))?;
    if city.trim().is_empty() {
        return Err(WeatherError::InvalidInput(BLANK_CITY.to_string()).into());
    }

    let weather = service.get_current_weather(&city).await?;
    Ok(Json(ResponseEnvelope::success(weather, SUCCESS_MESSAGE)))
}

async fn endpoint_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new()
        .route("/api/v1/weather", get(get_weather))
        // Must follow the routes it applies to.
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(endpoint_not_found)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}
