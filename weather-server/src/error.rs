use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};
use weather_core::WeatherError;

use crate::envelope::ResponseEnvelope;

pub const MISSING_CITY: &str = "Missing required query parameter: 'city'";
pub const BLANK_CITY: &str = "City must not be blank";
pub const INVALID_QUERY: &str = "Invalid query string";
pub const UNAVAILABLE: &str = "Weather service is temporarily unavailable";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please contact support.";
pub const NO_SUCH_ENDPOINT: &str = "The requested endpoint does not exist.";
pub const METHOD_NOT_ALLOWED: &str = "Request method is not supported for this endpoint.";

/// Every failure a request can end in.
#[derive(Debug)]
pub enum ApiError {
    InvalidQuery(String),
    RouteNotFound,
    MethodNotAllowed,
    Weather(WeatherError),
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        ApiError::Weather(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Weather(err) => match err {
                WeatherError::NotFound { .. } => StatusCode::NOT_FOUND,
                WeatherError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                WeatherError::ClientError { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
                }
                WeatherError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                WeatherError::MalformedUpstreamData(_) | WeatherError::Unknown(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Message shown to the caller. Never includes internal details.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidQuery(_) => INVALID_QUERY.to_string(),
            ApiError::RouteNotFound => NO_SUCH_ENDPOINT.to_string(),
            ApiError::MethodNotAllowed => METHOD_NOT_ALLOWED.to_string(),
            ApiError::Weather(err) => match err {
                WeatherError::NotFound { .. } | WeatherError::ClientError { .. } => {
                    err.to_string()
                }
                WeatherError::InvalidInput(reason) => reason.clone(),
                WeatherError::ServiceUnavailable(_) => UNAVAILABLE.to_string(),
                WeatherError::MalformedUpstreamData(_) | WeatherError::Unknown(_) => {
                    UNEXPECTED.to_string()
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::InvalidQuery(detail) = &self {
            debug!("Rejected query string: {detail}");
        }
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("Unhandled error while serving request: {self:?}");
        }

        let body = ResponseEnvelope::<()>::error(self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(err: WeatherError) -> ApiError {
        ApiError::Weather(err)
    }

    #[test]
    fn invalid_input_maps_to_bad_request_with_its_reason() {
        let missing = weather(WeatherError::InvalidInput(MISSING_CITY.into()));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.public_message(), MISSING_CITY);

        let blank = weather(WeatherError::InvalidInput(BLANK_CITY.into()));
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
        assert_eq!(blank.public_message(), BLANK_CITY);
    }

    #[test]
    fn routing_failures_map_to_their_statuses() {
        assert_eq!(ApiError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::RouteNotFound.public_message(), NO_SUCH_ENDPOINT);

        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::MethodNotAllowed.public_message(),
            METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn weather_failures_map_to_expected_statuses() {
        let cases = [
            (weather(WeatherError::not_found("Atlantis")), 404),
            (weather(WeatherError::InvalidInput("blank".into())), 400),
            (
                weather(WeatherError::ClientError {
                    status: 429,
                    reason: "Too Many Requests".into(),
                }),
                429,
            ),
            (weather(WeatherError::ServiceUnavailable("timeout".into())), 503),
            (
                weather(WeatherError::MalformedUpstreamData("no conditions".into())),
                500,
            ),
            (
                weather(WeatherError::Unknown(anyhow::anyhow!("boom"))),
                500,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status().as_u16(), expected, "{err:?}");
        }
    }

    #[test]
    fn internal_details_are_never_exposed() {
        let malformed = weather(WeatherError::MalformedUpstreamData(
            "missing field `main` at line 1".into(),
        ));
        assert_eq!(malformed.public_message(), UNEXPECTED);

        let unknown = weather(WeatherError::Unknown(anyhow::anyhow!(
            "reqwest::Error at src/provider.rs"
        )));
        assert_eq!(unknown.public_message(), UNEXPECTED);

        let unavailable = weather(WeatherError::ServiceUnavailable(
            "error sending request for url (http://10.0.0.1/)".into(),
        ));
        assert_eq!(unavailable.public_message(), UNAVAILABLE);
    }

    #[test]
    fn not_found_message_names_city() {
        let err = weather(WeatherError::not_found("Atlantis"));
        assert_eq!(err.public_message(), "City 'Atlantis' not found");
    }
}
