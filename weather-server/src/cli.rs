use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::net::TcpListener;
use tracing::info;
use weather_core::{Config, Units, WeatherCache, WeatherService, provider_from_config};

use crate::api;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather lookup HTTP service")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Address to listen on, e.g. "127.0.0.1:8080".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Interactively store the OpenWeather API key and default units.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Serve { bind } => serve(&config_path, bind).await,
            Command::Configure => configure(&config_path),
        }
    }
}

async fn serve(config_path: &Path, bind: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load_from(config_path)?;
    config.apply_env()?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let provider = provider_from_config(&config)?;
    let cache = WeatherCache::new(config.cache_ttl());
    let service = Arc::new(WeatherService::new(provider, cache));

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(
        "Weather server listening on {} (units: {}, cache ttl: {}s)",
        listener.local_addr()?,
        config.openweather.units,
        config.cache.ttl_secs
    );

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn configure(config_path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(config_path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let units = Select::new("Default units:", Units::all().to_vec())
        .prompt()
        .context("Failed to read units")?;

    config.set_credentials(api_key.trim().to_string(), units);
    config.api_key()?;
    config.save_to(config_path)?;

    println!("Configuration saved to {}", config_path.display());
    Ok(())
}
