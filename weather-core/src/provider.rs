use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    model::{Place, QueryResult},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions plus a daily forecast for a place.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch both halves of the report. Either both succeed or the whole query fails.
    async fn fetch_weather(&self, place: &Place) -> QueryResult;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    Ok(Box::new(OpenWeatherProvider::from_config(config)?))
}
