/// Fixtures shared by the unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::aqi::category_of;
use crate::ingest::PollutantSource;
use crate::model::{AqiRecord, FetchedSeries, PollutantReading, SeriesOrigin, SourceStatus, UpstreamError};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 5, 12, 0, 0).unwrap()
}

/// A stored record with every pollutant derived from `aqi`.
pub fn record(city: &str, aqi: f64, timestamp: DateTime<Utc>) -> AqiRecord {
    AqiRecord {
        city: city.to_string(),
        aqi,
        pm25: aqi / 2.0,
        pm10: aqi * 0.75,
        co: 600.0 + aqi,
        no2: 20.0,
        so2: 8.0,
        timestamp,
        category: category_of(aqi).label().to_string(),
    }
}

/// Hourly readings starting at `start`.
pub fn readings(pm25: &[f64], start: DateTime<Utc>) -> Vec<PollutantReading> {
    pm25.iter()
        .enumerate()
        .map(|(i, &pm)| PollutantReading {
            timestamp: start + Duration::hours(i as i64),
            pm25: pm,
            pm10: pm * 1.5,
            co: 700.0,
            no2: 20.0,
            so2: 9.0,
        })
        .collect()
}

/// Source returning a fixed series (or failing), counting calls.
pub struct StubSource {
    pub pm25: Option<Vec<f64>>,
    pub country_code: Option<String>,
    pub calls: usize,
}

impl StubSource {
    pub fn with_pm25(pm25: &[f64]) -> Self {
        Self {
            pm25: Some(pm25.to_vec()),
            country_code: Some("PK".to_string()),
            calls: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            pm25: None,
            country_code: None,
            calls: 0,
        }
    }
}

impl PollutantSource for StubSource {
    fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError> {
        self.calls += 1;
        let pm25 = self.pm25.as_ref().ok_or(UpstreamError::Timeout)?;
        Ok(FetchedSeries {
            readings: readings(pm25, t0()),
            status: SourceStatus {
                resolved_city: city.to_string(),
                country_code: self.country_code.clone(),
                origin: SeriesOrigin::Live,
            },
        })
    }
}
