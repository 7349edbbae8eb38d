/// Structured logging for the air quality monitoring service
///
/// Provides context-rich logging with city identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::{StoreError, UpstreamError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    OpenWeather,
    Demo,
    Database,
    Analysis,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::OpenWeather => write!(f, "OWM"),
            Component::Demo => write!(f, "DEMO"),
            Component::Database => write!(f, "DB"),
            Component::Analysis => write!(f, "ANALYSIS"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - unknown city, or no forecast published for it
    Expected,
    /// Unexpected failure - bad key, API error or changed response format
    Unexpected,
    /// Unknown - network trouble that may or may not be transient
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut guard) = LOGGER.lock() {
            *guard = Some(logger);
        }
    }

    fn format_entry(level: LogLevel, component: &Component, city: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let city_part = city.map(|c| format!(" [{}]", c)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, city_part, message)
    }

    fn log(&self, level: LogLevel, component: &Component, city: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, component, city, message);
        let city_part = city.map(|c| format!(" [{}]", c)).unwrap_or_default();

        // Console output goes to stderr; stdout carries command results.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, city_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, city_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, component: Component, city: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, city, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, city: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, city, message);
}

/// Log a warning message
pub fn warn(component: Component, city: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, city, message);
}

/// Log an error message
pub fn error(component: Component, city: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, city, message);
}

/// Log a debug message
pub fn debug(component: Component, city: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, city, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an upstream failure by its cause
pub fn classify_upstream_failure(err: &UpstreamError) -> FailureType {
    match err {
        UpstreamError::CityNotFound(_) | UpstreamError::NoData(_) => FailureType::Expected,
        UpstreamError::Http(_) | UpstreamError::Parse(_) | UpstreamError::MissingApiKey => {
            FailureType::Unexpected
        }
        UpstreamError::Timeout | UpstreamError::Connection(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log an upstream failure with automatic classification
pub fn log_upstream_failure(city: &str, operation: &str, err: &UpstreamError) {
    let failure_type = classify_upstream_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => info(Component::OpenWeather, Some(city), &message),
        FailureType::Unexpected => error(Component::OpenWeather, Some(city), &message),
        FailureType::Unknown => warn(Component::OpenWeather, Some(city), &message),
    }
}

/// Log that synthetic data replaced the live series
pub fn log_fallback(city: &str, reason: &str) {
    warn(
        Component::Demo,
        Some(city),
        &format!("Using demo data ({})", reason),
    );
}

/// Log a failed history write. The search still succeeds.
pub fn log_persistence_failure(city: &str, err: &StoreError) {
    error(
        Component::Database,
        Some(city),
        &format!("History append failed, result not saved: {}", err),
    );
}
