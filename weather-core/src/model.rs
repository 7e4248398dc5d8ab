use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Current-weather payload as returned by OpenWeather.
///
/// Only the fields the summary needs are mandatory; the rest default so that
/// trimmed responses still parse.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderWeatherResponse {
    #[serde(default)]
    pub coord: Option<Coord>,
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub base: Option<String>,
    pub main: MainMeasurements,
    #[serde(default)]
    pub visibility: Option<i64>,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sys: Option<Sys>,
    #[serde(default)]
    pub timezone: Option<i32>,
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub cod: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub main: Option<String>,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainMeasurements {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<i32>,
    pub humidity: i32,
    #[serde(default)]
    pub sea_level: Option<i32>,
    #[serde(default)]
    pub grnd_level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<i32>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    pub all: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Simplified weather view returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub city_name: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: i32,
    pub wind_speed: f64,
}

/// Project the provider payload onto a [`WeatherSummary`].
///
/// The description comes from the first condition entry; an empty condition
/// list is reported as [`WeatherError::MalformedUpstreamData`].
pub fn summarize(response: &ProviderWeatherResponse) -> Result<WeatherSummary, WeatherError> {
    let condition = response.weather.first().ok_or_else(|| {
        WeatherError::MalformedUpstreamData(format!(
            "no weather conditions in response for '{}'",
            response.name
        ))
    })?;

    Ok(WeatherSummary {
        city_name: response.name.clone(),
        temperature: response.main.temp,
        description: condition.description.clone(),
        humidity: response.main.humidity,
        wind_speed: response.wind.speed,
    })
}
