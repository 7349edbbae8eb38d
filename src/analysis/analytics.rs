/// Per-city statistics, category distribution and pollutant correlations.

use serde::Serialize;

use super::stats::{
    aqi_category_distribution, category_distribution, mean, pearson, round_to, CategoryCount, Stats, Trend,
};
use super::{live_series, or_logged};
use crate::aqi::{aqi_from_pm25, category_of, Category};
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;
use crate::model::{AnalysisError, AqiRecord, FetchedSeries};

/// Stored records needed for history-based analytics.
pub const MIN_RECORDS: usize = 5;

const LIVE_NOTE: &str =
    "Data from current live feed. Search this city multiple times to build historical data for better analysis.";

pub const CORRELATION_COLUMNS: [&str; 6] = ["aqi", "pm25", "pm10", "co", "no2", "so2"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsStatistics {
    pub aqi: Stats,
    pub pm25_mean: f64,
    pub pm10_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantCorrelations {
    pub columns: [&'static str; 6],
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAnalytics {
    pub city: String,
    pub total_records: usize,
    pub statistics: AnalyticsStatistics,
    pub category_distribution: Vec<CategoryCount>,
    pub trend: Trend,
    /// Only computed from stored history.
    pub correlations: Option<PollutantCorrelations>,
    pub note: Option<String>,
}

pub fn city_analytics(
    store: &mut dyn HistoryStore,
    source: &mut dyn PollutantSource,
    city: &str,
) -> Result<CityAnalytics, AnalysisError> {
    let records = or_logged(city, store.history_for_city(city, None));
    if records.len() >= MIN_RECORDS {
        return Ok(from_history(city, &records));
    }

    live_series(source, city, "Analytics live fetch")
        .map(|series| from_live(city, &series))
        .ok_or_else(|| AnalysisError::insufficient(city, "Not enough data for analysis."))
}

fn from_history(city: &str, records: &[AqiRecord]) -> CityAnalytics {
    let columns = [
        column(records, |r| r.aqi),
        column(records, |r| r.pm25),
        column(records, |r| r.pm10),
        column(records, |r| r.co),
        column(records, |r| r.no2),
        column(records, |r| r.so2),
    ];
    let aqi = &columns[0];

    // Stored labels are authoritative; rows with an unknown label are
    // recategorized from their AQI.
    let categories = records
        .iter()
        .map(|r| Category::from_label(&r.category).unwrap_or_else(|| category_of(r.aqi)));

    let correlations = PollutantCorrelations {
        columns: CORRELATION_COLUMNS,
        values: columns
            .iter()
            .map(|a| columns.iter().map(|b| round_to(pearson(a, b), 3)).collect())
            .collect(),
    };

    CityAnalytics {
        city: city.to_string(),
        total_records: records.len(),
        statistics: AnalyticsStatistics {
            aqi: Stats::compute(aqi).rounded(2),
            pm25_mean: round_to(mean(&columns[1]), 2),
            pm10_mean: round_to(mean(&columns[2]), 2),
        },
        category_distribution: category_distribution(categories),
        trend: Trend::from_values(aqi),
        correlations: Some(correlations),
        note: None,
    }
}

fn column(records: &[AqiRecord], field: fn(&AqiRecord) -> f64) -> Vec<f64> {
    records.iter().map(field).collect()
}

fn from_live(city: &str, series: &FetchedSeries) -> CityAnalytics {
    let pm25 = series.pm25_values();
    let pm10: Vec<f64> = series.readings.iter().map(|r| r.pm10).collect();
    let aqi: Vec<f64> = pm25.iter().map(|v| aqi_from_pm25(*v)).collect();

    CityAnalytics {
        city: city.to_string(),
        total_records: aqi.len(),
        statistics: AnalyticsStatistics {
            aqi: Stats::compute(&aqi).rounded(2),
            pm25_mean: round_to(mean(&pm25), 2),
            pm10_mean: round_to(mean(&pm10), 2),
        },
        category_distribution: aqi_category_distribution(&aqi),
        trend: Trend::Stable,
        correlations: None,
        note: Some(LIVE_NOTE.to_string()),
    }
}
