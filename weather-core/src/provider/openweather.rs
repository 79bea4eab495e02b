use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{config::ProviderConfig, model::WeatherSnapshot};

use super::{WeatherError, WeatherProvider};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_LANG: &str = "ru";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::build(
            api_key,
            DEFAULT_ENDPOINT.to_string(),
            DEFAULT_LANG.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        Self::build(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.lang.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build(
        api_key: String,
        endpoint: String,
        lang: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, endpoint, lang, http })
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network_failure("send request to OpenWeather", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| network_failure("read OpenWeather response body", e))?;

        if !status.is_success() {
            tracing::error!(
                city,
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather rejected the request"
            );
            return Err(WeatherError::ProviderRejected { status: status.as_u16() });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| network_failure("parse OpenWeather JSON", e))?;

        let description = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .ok_or_else(|| {
                WeatherError::NetworkFailure(
                    "OpenWeather response contained no weather description".to_string(),
                )
            })?;

        tracing::info!(city, "fetched weather from OpenWeather");

        Ok(WeatherSnapshot {
            city: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            description,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(city).await
    }
}

fn network_failure(action: &str, err: impl std::fmt::Display) -> WeatherError {
    tracing::error!(error = %err, "failed to {action}");
    WeatherError::NetworkFailure(format!("failed to {action}: {err}"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
