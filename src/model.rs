/// PollutantReading, AqiRecord, FetchedSeries and the error enums shared
/// across the service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O; the only logic is record construction and the
/// `Display` impls of the error types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One sample from the upstream source. All concentrations in µg/m³.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
}

/// One persisted search result.
///
/// `aqi` is always derived from `pm25`; the other pollutants are stored as a
/// snapshot only. `city` is exactly what the user typed, so "Delhi" and
/// "delhi" are separate keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiRecord {
    pub city: String,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
    pub timestamp: DateTime<Utc>,
    pub category: String,
}

/// Where a fetched series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesOrigin {
    Live,
    /// Synthetic data substituted for the live source.
    Demo { reason: String },
}

impl SeriesOrigin {
    pub fn is_demo(&self) -> bool {
        matches!(self, SeriesOrigin::Demo { .. })
    }
}

/// Resolution details returned alongside a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// City name as resolved by the upstream geocoder (or as typed).
    pub resolved_city: String,
    /// ISO 3166 alpha-2 code, when known.
    pub country_code: Option<String>,
    pub origin: SeriesOrigin,
}

/// A time series of readings for one city, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedSeries {
    pub readings: Vec<PollutantReading>,
    pub status: SourceStatus,
}

impl FetchedSeries {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn pm25_values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.pm25).collect()
    }

    pub fn latest(&self) -> Option<&PollutantReading> {
        self.readings.last()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures talking to the upstream pollution API.
///
/// These never reach the end user: `ingest::FallbackSource` replaces the
/// series with demo data and logs the failure.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Non-2xx HTTP response.
    Http(u16),
    /// The request exceeded the configured timeout.
    Timeout,
    /// DNS, TLS or socket failure.
    Connection(String),
    /// The response body could not be deserialized.
    Parse(String),
    /// The geocoder returned no match for the city.
    CityNotFound(String),
    /// The city resolved but the forecast list was empty.
    NoData(String),
    /// No API key configured.
    MissingApiKey,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Http(code) => write!(f, "HTTP error: {}", code),
            UpstreamError::Timeout => write!(f, "Request timeout"),
            UpstreamError::Connection(msg) => write!(f, "Connection error: {}", msg),
            UpstreamError::Parse(msg) => write!(f, "Parse error: {}", msg),
            UpstreamError::CityNotFound(city) => write!(f, "City not found: {}", city),
            UpstreamError::NoData(city) => write!(f, "No AQI data available for city: {}", city),
            UpstreamError::MissingApiKey => write!(f, "API key error: no key configured"),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Failures reading from or writing to the history store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Connection(String),
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Database connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "Database query error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<postgres::Error> for StoreError {
    fn from(err: postgres::Error) -> Self {
        if err.is_closed() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

/// Errors surfaced to the caller of an aggregation or search operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Not enough history (and no usable live data) to answer.
    InsufficientData { city: String, message: String },
    /// The request itself is malformed, e.g. fewer than two cities.
    InvalidInput(String),
    /// A read-only history listing failed.
    History(StoreError),
}

impl AnalysisError {
    pub fn insufficient(city: &str, message: impl Into<String>) -> Self {
        AnalysisError::InsufficientData {
            city: city.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InsufficientData { city, message } => write!(
                f,
                "{} Please search \"{}\" from the main dashboard first to collect data.",
                message, city
            ),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid request: {}", msg),
            AnalysisError::History(err) => write!(f, "History unavailable: {}", err),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        AnalysisError::History(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(readings: Vec<PollutantReading>) -> FetchedSeries {
        FetchedSeries {
            readings,
            status: SourceStatus {
                resolved_city: "Lahore".to_string(),
                country_code: Some("PK".to_string()),
                origin: SeriesOrigin::Live,
            },
        }
    }

    #[test]
    fn test_fetched_series_latest_is_last_reading() {
        let t0 = Utc.with_ymd_and_hms(2024, 11, 2, 0, 0, 0).unwrap();
        let reading = |pm25: f64, hour: i64| PollutantReading {
            timestamp: t0 + chrono::Duration::hours(hour),
            pm25,
            pm10: pm25 * 1.5,
            co: 600.0,
            no2: 20.0,
            so2: 8.0,
        };
        let s = series(vec![reading(40.0, 0), reading(80.0, 1)]);
        assert_eq!(s.latest().map(|r| r.pm25), Some(80.0));
        assert_eq!(s.pm25_values(), vec![40.0, 80.0]);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_insufficient_data_message_names_remediation() {
        let err = AnalysisError::insufficient("Quetta", "Not enough data for analysis.");
        let text = err.to_string();
        assert!(text.contains("search \"Quetta\""), "got: {}", text);
    }

    #[test]
    fn test_demo_origin_is_flagged() {
        assert!(SeriesOrigin::Demo { reason: "timeout".into() }.is_demo());
        assert!(!SeriesOrigin::Live.is_demo());
    }
}
