//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client behind the `WeatherProvider` trait
//! - Daily forecast derivation from the provider's 3-hourly timeline
//! - The `Dashboard`, which publishes the outcome of the newest query
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use dashboard::{Dashboard, DashboardState, Publication};
pub use error::{Endpoint, WeatherError};
pub use model::{CurrentConditions, ForecastEntry, ForecastSet, Place, QueryResult, WeatherReport};
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};
