use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::{
    ProviderWeatherResponse, WeatherError,
    config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, Units},
};

use super::WeatherProvider;

const USER_AGENT: &str = "WeatherApp/1.0";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProviderBuilder {
    api_key: String,
    base_url: String,
    units: Units,
    timeout: Duration,
}

impl OpenWeatherProviderBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<OpenWeatherProvider> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            units: self.units,
            http,
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: impl Into<String>) -> OpenWeatherProviderBuilder {
        OpenWeatherProviderBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<ProviderWeatherResponse, WeatherError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("units", self.units.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key.
                let e = e.without_url();
                if e.is_builder() {
                    WeatherError::Unknown(
                        anyhow::Error::new(e).context("Failed to build OpenWeather request"),
                    )
                } else {
                    error!("Error while calling OpenWeather for {city}: {e}");
                    WeatherError::ServiceUnavailable(e.to_string())
                }
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to read OpenWeather response body for {city}: {e}");
            WeatherError::ServiceUnavailable(e.to_string())
        })?;

        if !status.is_success() {
            return Err(classify_failure(city, status, &body));
        }

        let parsed: ProviderWeatherResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse OpenWeather JSON for {city}: {e}; body: {}",
                truncate_body(&body)
            );
            WeatherError::MalformedUpstreamData(e.to_string())
        })?;

        debug!(
            "OpenWeather answered for {city}: name={}, conditions={}",
            parsed.name,
            parsed.weather.len()
        );

        Ok(parsed)
    }
}

fn classify_failure(city: &str, status: StatusCode, body: &str) -> WeatherError {
    if status == StatusCode::NOT_FOUND {
        warn!("City not found in OpenWeather API: {city}");
        return WeatherError::not_found(city);
    }

    if status.is_client_error() {
        error!(
            "Client error while fetching weather for {city}: {status}: {}",
            truncate_body(body)
        );
        return WeatherError::ClientError {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
    }

    error!(
        "OpenWeather request for {city} failed with status {status}: {}",
        truncate_body(body)
    );
    WeatherError::ServiceUnavailable(format!("upstream responded with {status}"))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<ProviderWeatherResponse, WeatherError> {
        self.fetch_current(city).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
