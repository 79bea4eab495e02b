use crate::{Config, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

/// Normalized failure of a single provider call.
///
/// The messages are meant for logs. Users only ever see a generic reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("weather provider rejected the request with status {status}")]
    ProviderRejected { status: u16 },

    #[error("weather provider call failed: {0}")]
    NetworkFailure(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the provider described by the `[provider]` config section.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = config.provider_config().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather-bot configure` or set OPENWEATHERMAP_API_KEY."
        )
    })?;

    Ok(Arc::new(OpenWeatherProvider::from_config(provider)?))
}
