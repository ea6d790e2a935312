use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;
use weather_core::{Config, Dashboard, DashboardState, Place, provider_from_config};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and daily forecast for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and default city.
    Configure,

    /// Show current weather and the daily forecast once.
    Show {
        /// City name; defaults to the configured default city.
        place: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard: show a city, then prompt for more.
    Dashboard {
        /// City shown on start; defaults to the configured default city.
        place: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place, json } => show(place, json).await,
            Command::Dashboard { place } => interactive(place).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let default_place = Text::new("Default city:")
        .with_default(config.default_place())
        .prompt()
        .context("Failed to read default city")?;
    config.default_place = Some(Place::parse(&default_place)?.to_string());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn dashboard_from_config(config: &Config) -> anyhow::Result<Dashboard> {
    let provider = provider_from_config(config)?;
    Ok(Dashboard::new(Arc::from(provider)))
}

fn initial_place(config: &Config, place: Option<String>) -> anyhow::Result<Place> {
    let raw = place.unwrap_or_else(|| config.default_place().to_string());
    Ok(Place::parse(&raw)?)
}

async fn show(place: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let place = initial_place(&config, place)?;
    let dashboard = dashboard_from_config(&config)?;

    dashboard.search(&place).await;

    match dashboard.state() {
        DashboardState::Ready(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        DashboardState::Failed { message } => bail!(message),
        state => println!("{}", render::state(&state)),
    }
    Ok(())
}

async fn interactive(place: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut place = initial_place(&config, place)?;
    let dashboard = dashboard_from_config(&config)?;

    loop {
        dashboard.search(&place).await;
        println!("{}", render::state(&dashboard.state()));

        place = loop {
            let input = match prompt_city().await? {
                Some(input) => input,
                None => return Ok(()),
            };
            match Place::parse(&input) {
                Ok(place) => break place,
                Err(err) => {
                    debug!(%err, "ignoring blank search");
                    continue;
                }
            }
        };
    }
}

/// Ask for the next city. `None` when the user escapes or interrupts.
async fn prompt_city() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("City:")
            .with_placeholder("Enter city name")
            .with_help_message("Esc or Ctrl-C to quit")
            .prompt()
    })
    .await
    .context("Prompt task failed")?;

    match answer {
        Ok(input) => Ok(Some(input)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read city name"),
    }
}
