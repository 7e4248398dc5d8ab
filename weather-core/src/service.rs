use tracing::{info, instrument};

use crate::{
    WeatherError, WeatherSummary,
    cache::{WeatherCache, cache_key},
    model::summarize,
    provider::WeatherProvider,
};

/// Looks up current weather for a city through the cache, falling back to the
/// provider on a miss.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    cache: WeatherCache,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>, cache: WeatherCache) -> Self {
        Self { provider, cache }
    }

    /// The city is expected to be non-blank; callers validate it.
    #[instrument(skip(self))]
    pub async fn get_current_weather(&self, city: &str) -> Result<WeatherSummary, WeatherError> {
        let key = cache_key(city);

        self.cache
            .lookup_or_compute(&key, || async {
                info!("Get current weather for city: {city}");

                let response = self.provider.current_weather(city).await?;
                let summary = summarize(&response)?;

                info!(
                    "Fetched weather for city: {city} = {} / {}",
                    summary.city_name, summary.description
                );
                Ok(summary)
            })
            .await
    }
}
