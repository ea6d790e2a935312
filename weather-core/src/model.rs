use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A user-supplied location, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place(String);

impl Place {
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::EmptyPlace);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Place {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Place::parse(value)
    }
}

/// Snapshot of the weather right now, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Place name as echoed back by the provider, e.g. "Delhi" for "delhi".
    pub place: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub category: String,
    pub description: String,
}

/// One representative forecast sample for a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: NaiveDateTime,
    pub temperature_c: f64,
    pub category: String,
    pub description: String,
}

impl ForecastEntry {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Daily forecast, one entry per day in ascending date order.
pub type ForecastSet = Vec<ForecastEntry>;

/// Current conditions and daily forecast for the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: ForecastSet,
}

pub type QueryResult = Result<WeatherReport, WeatherError>;
