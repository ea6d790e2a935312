use reqwest::StatusCode;
use thiserror::Error;

/// Which provider endpoint a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can go wrong while resolving a place into a weather report.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("{endpoint} request could not be completed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Provider {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    /// The body did not have the expected shape.
    #[error("failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: Endpoint, reason: String },

    #[error("place name must not be empty")]
    EmptyPlace,
}

impl WeatherError {
    /// The one message shown to users for any failed query.
    pub const USER_MESSAGE: &'static str = "City not found or failed to fetch data.";

    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::EmptyPlace => "Please enter a city name.",
            _ => Self::USER_MESSAGE,
        }
    }

    pub(crate) fn provider(endpoint: Endpoint, status: StatusCode, body: &str) -> Self {
        WeatherError::Provider { endpoint, status, body: truncate_body(body) }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
