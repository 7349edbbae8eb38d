/// Service configuration.
///
/// Loaded from a TOML file; every section and key is optional. `.env` is
/// read with `dotenv`, then `DATABASE_URL` and `OPENWEATHER_API_KEY`
/// override the file.

use serde::Deserialize;
use std::path::Path;

use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "aqmon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub geocoding_url: String,
    pub air_pollution_url: String,
    /// Per-request timeout; bounds worst-case latency of a search.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocoding_url: "http://api.openweathermap.org/geo/1.0/direct".to_string(),
            air_pollution_url: "http://api.openweathermap.org/data/2.5/air_pollution/forecast".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Cannot read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Cannot parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads `path` if it exists, otherwise starts from defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// File, then `.env`, then process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        dotenv::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies environment overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(key) = non_empty("OPENWEATHER_API_KEY") {
            self.upstream.api_key = Some(key);
        }
    }
}
