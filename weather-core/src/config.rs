use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Place queried when none is given.
pub const DEFAULT_PLACE: &str = "Delhi";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Settings for the OpenWeatherMap provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,

    /// Override for the API root, mostly useful for proxies and tests.
    pub base_url: Option<String>,

    /// Transport-level timeout. Unset means wait for as long as the connection lives.
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_place = "Paris"
///
/// [openweather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub default_place: Option<String>,

    #[serde(default)]
    pub openweather: ProviderConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    /// API key from the environment, falling back to the stored one.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.openweather.api_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeatherMap API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn base_url(&self) -> &str {
        self.openweather.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn default_place(&self) -> &str {
        self.default_place
            .as_deref()
            .filter(|place| !place.trim().is_empty())
            .unwrap_or(DEFAULT_PLACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.resolve_api_key_with(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeatherMap API key configured"));
        assert!(msg.contains("weather configure"));
    }

    #[test]
    fn environment_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(cfg.resolve_api_key_with(Some("FROM_ENV".into())).unwrap(), "FROM_ENV");
        assert_eq!(cfg.resolve_api_key_with(None).unwrap(), "STORED");
        assert_eq!(cfg.resolve_api_key_with(Some("  ".into())).unwrap(), "STORED");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.default_place(), "Delhi");
        assert_eq!(cfg.openweather.timeout_secs, None);
    }

    #[test]
    fn parses_toml_with_overrides() {
        let cfg = Config::from_toml(
            r#"
            default_place = "Paris"

            [openweather]
            api_key = "KEY"
            base_url = "http://localhost:8080"
            timeout_secs = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.default_place(), "Paris");
        assert_eq!(cfg.base_url(), "http://localhost:8080");
        assert_eq!(cfg.openweather.timeout_secs, Some(5));
        assert_eq!(cfg.resolve_api_key_with(None).unwrap(), "KEY");
    }

    #[test]
    fn empty_file_is_a_valid_config() {
        let cfg = Config::from_toml("").expect("empty config");
        assert!(cfg.openweather.api_key.is_none());
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut cfg = Config { default_place: Some("Oslo".into()), ..Config::default() };
        cfg.set_api_key("KEY".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();

        assert_eq!(back.default_place(), "Oslo");
        assert_eq!(back.openweather.api_key.as_deref(), Some("KEY"));
    }
}
