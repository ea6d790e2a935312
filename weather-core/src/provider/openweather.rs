use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    config::DEFAULT_BASE_URL,
    error::{Endpoint, WeatherError},
    forecast::daily_at_noon,
    model::{CurrentConditions, ForecastEntry, Place, QueryResult, WeatherReport},
};

use super::WeatherProvider;

/// Format of `dt_txt` in forecast samples.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self::with_client(api_key, base_url, Client::new())
    }

    fn with_client(api_key: String, base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.openweather.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self::with_client(api_key, config.base_url(), http))
    }

    fn url(&self, endpoint: Endpoint) -> String {
        let path = match endpoint {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        };
        format!("{}/{}", self.base_url, path)
    }

    /// GET one endpoint and return its body if the status is a success.
    async fn fetch_body(&self, endpoint: Endpoint, place: &Place) -> Result<String, WeatherError> {
        let res = self
            .http
            .get(self.url(endpoint))
            .query(&[
                ("q", place.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| WeatherError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| WeatherError::Transport { endpoint, source })?;

        debug!(%endpoint, %status, bytes = body.len(), "provider responded");

        if !status.is_success() {
            return Err(WeatherError::provider(endpoint, status, &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(place = %place))]
    async fn fetch_weather(&self, place: &Place) -> QueryResult {
        let (current, forecast) = tokio::join!(
            self.fetch_body(Endpoint::Current, place),
            self.fetch_body(Endpoint::Forecast, place),
        );

        let report = current.and_then(|current| {
            let forecast = forecast?;
            Ok(WeatherReport {
                current: parse_current(&current)?,
                forecast: daily_at_noon(parse_timeline(&forecast)?),
            })
        });

        if let Err(err) = &report {
            warn!(error = %err, "weather query failed");
        }
        report
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Category and description of the first weather tag, or "Unknown".
fn first_tag(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()))
}

fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::Decode { endpoint: Endpoint::Current, reason: e.to_string() })?;

    let (category, description) = first_tag(&parsed.weather);

    Ok(CurrentConditions {
        place: parsed.name,
        temperature_c: parsed.main.temp,
        humidity_pct: parsed.main.humidity,
        category,
        description,
    })
}

fn parse_timeline(body: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
    let decode_err =
        |reason: String| WeatherError::Decode { endpoint: Endpoint::Forecast, reason };

    let parsed: OwForecastResponse =
        serde_json::from_str(body).map_err(|e| decode_err(e.to_string()))?;

    parsed
        .list
        .into_iter()
        .map(|entry| {
            let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, TIMESTAMP_FORMAT)
                .map_err(|e| decode_err(format!("invalid dt_txt '{}': {e}", entry.dt_txt)))?;
            let (category, description) = first_tag(&entry.weather);

            Ok(ForecastEntry { timestamp, temperature_c: entry.main.temp, category, description })
        })
        .collect()
}
