//! Core library for the weather lookup service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider adapter (OpenWeather)
//! - Shared domain models and the provider-to-summary mapping
//! - A time-bounded cache and the lookup service built on top of it
//!
//! It is used by `weather-server`, but has no knowledge of HTTP routing.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use cache::WeatherCache;
pub use config::{Config, Units};
pub use error::WeatherError;
pub use model::{ProviderWeatherResponse, WeatherSummary, summarize};
pub use provider::{WeatherProvider, provider_from_config};
pub use service::WeatherService;
