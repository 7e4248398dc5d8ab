use crate::{
    Config, ProviderWeatherResponse, WeatherError, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Outbound adapter for the upstream weather API.
///
/// One call, no retries: a failure is returned to the caller as-is.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<ProviderWeatherResponse, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::builder(api_key)
        .base_url(&config.openweather.base_url)
        .units(config.openweather.units)
        .timeout(config.request_timeout())
        .build()?;

    Ok(Box::new(provider))
}
