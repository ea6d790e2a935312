use std::fmt::Write;

use weather_core::{CurrentConditions, DashboardState, ForecastEntry, WeatherReport};

pub fn state(state: &DashboardState) -> String {
    match state {
        DashboardState::Idle => String::new(),
        DashboardState::Pending { place } => format!("Fetching weather for {place}..."),
        DashboardState::Ready(report) => self::report(report),
        DashboardState::Failed { message } => format!("Error: {message}"),
    }
}

pub fn report(report: &WeatherReport) -> String {
    let mut out = current(&report.current);
    if !report.forecast.is_empty() {
        out.push('\n');
        out.push_str(&forecast(&report.forecast));
    }
    out
}

fn current(current: &CurrentConditions) -> String {
    format!(
        "Weather in {}\n  Temp:        {:.1}°C\n  Humidity:    {}%\n  Description: {}\n",
        current.place, current.temperature_c, current.humidity_pct, current.description,
    )
}

fn forecast(entries: &[ForecastEntry]) -> String {
    let mut out = format!("{}-Day Forecast\n", entries.len());
    for entry in entries {
        let _ = writeln!(
            out,
            "  {:<12}{:>7.1}°C  {:<14}{}",
            entry.timestamp.format("%a %d %b").to_string(),
            entry.temperature_c,
            entry.category,
            entry.description,
        );
    }
    out
}
