/// OpenWeather Air Pollution API Client
///
/// Resolves a city name to coordinates with the geocoding endpoint, then
/// retrieves the hourly air-pollution forecast for those coordinates.
///
/// API Documentation: https://openweathermap.org/api/air-pollution
/// Geocoding: https://openweathermap.org/api/geocoding-api

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::PollutantSource;
use crate::config::UpstreamConfig;
use crate::model::{FetchedSeries, PollutantReading, SeriesOrigin, SourceStatus, UpstreamError};

// Substituted for components missing from a forecast entry.
const DEFAULT_PM25: f64 = 25.0;
const DEFAULT_PM10: f64 = 50.0;
const DEFAULT_CO: f64 = 500.0;
const DEFAULT_NO2: f64 = 20.0;
const DEFAULT_SO2: f64 = 10.0;

// ============================================================================
// OpenWeather API Response Structures
// ============================================================================

/// One geocoding match
#[derive(Debug, Deserialize)]
pub struct GeoLocation {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
}

/// Air pollution forecast response
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub dt: i64,  // Unix seconds
    #[serde(default)]
    pub components: Components,
}

/// Concentrations in µg/m³
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
}

// ============================================================================
// API Client
// ============================================================================

pub struct OpenWeatherSource {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    geocoding_url: String,
    air_pollution_url: String,
}

impl OpenWeatherSource {
    /// Builds the blocking client with the configured timeout.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            geocoding_url: config.geocoding_url.clone(),
            air_pollution_url: config.air_pollution_url.clone(),
        })
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(UpstreamError::Http(response.status().as_u16()));
        }

        response.text().map_err(map_reqwest_error)
    }
}

impl PollutantSource for OpenWeatherSource {
    fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError> {
        let api_key = self.api_key.clone().ok_or(UpstreamError::MissingApiKey)?;

        let geo_body = self.get(
            &self.geocoding_url,
            &[("q", city.to_string()), ("limit", "1".to_string()), ("appid", api_key.clone())],
        )?;
        let location = parse_geocoding(&geo_body)?
            .ok_or_else(|| UpstreamError::CityNotFound(city.to_string()))?;

        let aqi_body = self.get(
            &self.air_pollution_url,
            &[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", api_key),
            ],
        )?;
        let readings = parse_air_pollution(&aqi_body)?;
        if readings.is_empty() {
            return Err(UpstreamError::NoData(city.to_string()));
        }

        Ok(FetchedSeries {
            readings,
            status: SourceStatus {
                resolved_city: location.name.unwrap_or_else(|| city.to_string()),
                country_code: location.country,
                origin: SeriesOrigin::Live,
            },
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if let Some(status) = err.status() {
        UpstreamError::Http(status.as_u16())
    } else if err.is_decode() || err.is_body() {
        UpstreamError::Parse(err.to_string())
    } else {
        UpstreamError::Connection(err.to_string())
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// First geocoding match, or `None` if the list is empty.
pub fn parse_geocoding(body: &str) -> Result<Option<GeoLocation>, UpstreamError> {
    let matches: Vec<GeoLocation> =
        serde_json::from_str(body).map_err(|e| UpstreamError::Parse(e.to_string()))?;
    Ok(matches.into_iter().next())
}

/// Forecast entries as readings, in response order.
pub fn parse_air_pollution(body: &str) -> Result<Vec<PollutantReading>, UpstreamError> {
    let response: AirPollutionResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::Parse(e.to_string()))?;

    response
        .list
        .into_iter()
        .map(|entry| {
            let timestamp: DateTime<Utc> = DateTime::from_timestamp(entry.dt, 0)
                .ok_or_else(|| UpstreamError::Parse(format!("invalid timestamp {}", entry.dt)))?;
            let c = entry.components;
            Ok(PollutantReading {
                timestamp,
                pm25: c.pm2_5.unwrap_or(DEFAULT_PM25),
                pm10: c.pm10.unwrap_or(DEFAULT_PM10),
                co: c.co.unwrap_or(DEFAULT_CO),
                no2: c.no2.unwrap_or(DEFAULT_NO2),
                so2: c.so2.unwrap_or(DEFAULT_SO2),
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
