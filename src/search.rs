/// City search: fetch, summarize, record one history row, report.
///
/// This is the only write path into the history store. A failed append is
/// logged and the search still succeeds with `persisted = false`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::summary::{summarize, Summary};
use crate::aqi::health_recommendation;
use crate::cities::country_name;
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;
use crate::logging::{self, Component};
use crate::model::{AnalysisError, SeriesOrigin};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    /// City key exactly as searched.
    pub city: String,
    /// Name returned by the geocoder, or the search text.
    pub city_display: String,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub origin: SeriesOrigin,
    pub summary: Summary,
    pub severity_class: &'static str,
    pub recommendation: &'static str,
    /// Whether the history row was written.
    pub persisted: bool,
}

pub fn search_city(
    store: &mut dyn HistoryStore,
    source: &mut dyn PollutantSource,
    city: &str,
    now: DateTime<Utc>,
) -> Result<SearchReport, AnalysisError> {
    logging::info(Component::System, Some(city), "Searching AQI");

    let series = source.fetch(city).map_err(|err| {
        logging::log_upstream_failure(city, "City search", &err);
        AnalysisError::insufficient(city, format!("No AQI data available for {}.", city))
    })?;
    let summary = summarize(&series.readings)
        .ok_or_else(|| AnalysisError::insufficient(city, format!("No AQI data available for {}.", city)))?;

    let record = summary.to_record(city, now);
    let persisted = match store.append(&record) {
        Ok(()) => true,
        Err(err) => {
            logging::log_persistence_failure(city, &err);
            false
        }
    };

    let country_code = series.status.country_code;
    Ok(SearchReport {
        city: city.to_string(),
        city_display: series.status.resolved_city,
        country: country_code.as_deref().map(country_name),
        country_code,
        origin: series.status.origin,
        severity_class: summary.category.severity_class(),
        recommendation: health_recommendation(summary.latest_aqi),
        summary,
        persisted,
    })
}
