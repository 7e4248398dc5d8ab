use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Twelve hours.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// Upstream provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub units: Units,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            units: Units::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [openweather]
/// api_key = "..."
/// units = "metric"
///
/// [cache]
/// ttl_secs = 43200
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub openweather: OpenWeatherConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-service", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            self.openweather.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENWEATHER_BASE_URL") {
            self.openweather.base_url = url;
        }
        if let Some(units) = lookup("OPENWEATHER_UNITS") {
            self.openweather.units = units.parse()?;
        }
        if let Some(secs) = lookup("OPENWEATHER_TIMEOUT_SECS") {
            self.openweather.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid OPENWEATHER_TIMEOUT_SECS: {secs}"))?;
        }
        if let Some(secs) = lookup("WEATHER_CACHE_TTL_SECS") {
            self.cache.ttl_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid WEATHER_CACHE_TTL_SECS: {secs}"))?;
        }
        if let Some(bind) = lookup("WEATHER_BIND") {
            self.server.bind = bind;
        }

        Ok(())
    }

    /// Returns the configured API key, if present and non-blank.
    pub fn api_key(&self) -> Result<&str> {
        self.openweather
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather-server configure` or set OPENWEATHER_API_KEY."
                )
            })
    }

    /// Convenience helper: set/replace the API key and default units.
    pub fn set_credentials(&mut self, api_key: String, units: Units) {
        self.openweather.api_key = Some(api_key);
        self.openweather.units = units;
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.openweather.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_sensible() {
        let cfg = Config::default();

        assert_eq!(cfg.openweather.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.openweather.units, Units::Metric);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(43_200));
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weather-server configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_credentials("   ".into(), Units::Metric);

        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = Config::default();
        cfg.set_credentials("FILE_KEY".into(), Units::Imperial);

        cfg.apply_overrides(vars(&[
            ("OPENWEATHER_API_KEY", "ENV_KEY"),
            ("OPENWEATHER_UNITS", "standard"),
            ("OPENWEATHER_TIMEOUT_SECS", "3"),
            ("WEATHER_CACHE_TTL_SECS", "60"),
            ("WEATHER_BIND", "127.0.0.1:9000"),
        ]))
        .unwrap();

        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");
        assert_eq!(cfg.openweather.units, Units::Standard);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(vars(&[("WEATHER_CACHE_TTL_SECS", "soon")]))
            .unwrap_err();

        assert!(err.to_string().contains("WEATHER_CACHE_TTL_SECS"));
    }

    #[test]
    fn units_parse_case_insensitively() {
        for units in Units::all() {
            let upper = units.as_str().to_uppercase();
            assert_eq!(upper.parse::<Units>().unwrap(), *units);
        }
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [openweather]
            api_key = "KEY"
            units = "imperial"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key().unwrap(), "KEY");
        assert_eq!(cfg.openweather.units, Units::Imperial);
        assert_eq!(cfg.openweather.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.cache.ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn save_and_load_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_credentials("SAVED".into(), Units::Imperial);
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key().unwrap(), "SAVED");
        assert_eq!(loaded.openweather.units, Units::Imperial);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.openweather.api_key.is_none());
    }
}
