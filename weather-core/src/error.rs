use thiserror::Error;

/// Failure kinds surfaced by the provider adapter and the lookup service.
///
/// The HTTP layer owns the mapping from these to status codes; nothing in
/// this crate knows about transport-level responses.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Upstream reported the city as unknown.
    #[error("City '{city}' not found")]
    NotFound { city: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream rejected the request with a 4xx other than 404.
    #[error("Client error: {reason}")]
    ClientError { status: u16, reason: String },

    /// Network failure, timeout or 5xx from upstream.
    #[error("Weather provider unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream answered successfully but the payload is unusable.
    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl WeatherError {
    pub fn not_found(city: impl Into<String>) -> Self {
        Self::NotFound { city: city.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_quotes_city() {
        let err = WeatherError::not_found("Atlantis");
        assert_eq!(err.to_string(), "City 'Atlantis' not found");
    }

    #[test]
    fn client_error_message_carries_reason() {
        let err = WeatherError::ClientError {
            status: 401,
            reason: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "Client error: Unauthorized");
    }
}
