/// Current-conditions summary for one fetched series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::stats::{round_to, Stats, Trend};
use crate::aqi::{aqi_from_pm25, category_of, Category};
use crate::model::{AqiRecord, PollutantReading};

/// Maximum number of points in the chart series.
pub const CHART_POINTS: usize = 48;

/// Latest value of each pollutant, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantSnapshot {
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub latest_aqi: f64,
    pub category: Category,
    pub latest_timestamp: DateTime<Utc>,
    pub pollutants: PollutantSnapshot,
    /// First `CHART_POINTS` readings, in input order.
    pub chart: Vec<ChartPoint>,
    pub stats: Stats,
    pub trend: Trend,
}

impl Summary {
    /// Builds the row persisted for a search. `city` is stored as given.
    pub fn to_record(&self, city: &str, timestamp: DateTime<Utc>) -> AqiRecord {
        AqiRecord {
            city: city.to_string(),
            aqi: self.latest_aqi,
            pm25: self.pollutants.pm25,
            pm10: self.pollutants.pm10,
            co: self.pollutants.co,
            no2: self.pollutants.no2,
            so2: self.pollutants.so2,
            timestamp,
            category: self.category.label().to_string(),
        }
    }
}

/// Summarizes a chronologically ordered series. Returns `None` when empty.
///
/// Statistics cover the whole series; the chart is capped at the first
/// `CHART_POINTS` entries.
pub fn summarize(readings: &[PollutantReading]) -> Option<Summary> {
    let latest = readings.last()?;
    let aqi_values: Vec<f64> = readings.iter().map(|r| aqi_from_pm25(r.pm25)).collect();
    let latest_aqi = round_to(aqi_values[aqi_values.len() - 1], 2);

    let chart = readings
        .iter()
        .zip(&aqi_values)
        .take(CHART_POINTS)
        .map(|(r, aqi)| ChartPoint {
            timestamp: r.timestamp,
            aqi: round_to(*aqi, 1),
        })
        .collect();

    Some(Summary {
        latest_aqi,
        category: category_of(latest_aqi),
        latest_timestamp: latest.timestamp,
        pollutants: PollutantSnapshot {
            pm25: round_to(latest.pm25, 2),
            pm10: round_to(latest.pm10, 2),
            co: round_to(latest.co, 2),
            no2: round_to(latest.no2, 2),
            so2: round_to(latest.so2, 2),
        },
        chart,
        stats: Stats::compute(&aqi_values).rounded(2),
        trend: Trend::from_values(&aqi_values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hourly(pm25: &[f64]) -> Vec<PollutantReading> {
        let start = Utc.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap();
        pm25.iter()
            .enumerate()
            .map(|(i, &pm)| PollutantReading {
                timestamp: start + Duration::hours(i as i64),
                pm25: pm,
                pm10: pm * 1.5,
                co: 712.456,
                no2: 21.0,
                so2: 9.999,
            })
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_summary() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_chart_is_capped_at_48_in_input_order() {
        let pm: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let readings = hourly(&pm);
        let summary = summarize(&readings).unwrap();
        assert_eq!(summary.chart.len(), 48);
        for (point, reading) in summary.chart.iter().zip(&readings) {
            assert_eq!(point.timestamp, reading.timestamp);
        }
        assert!(summary.chart.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(summary.stats.count, 60, "stats cover the full series");
    }

    #[test]
    fn test_short_series_chart_keeps_every_point() {
        let summary = summarize(&hourly(&[5.0, 6.0, 7.0])).unwrap();
        assert_eq!(summary.chart.len(), 3);
    }

    #[test]
    fn test_latest_values_come_from_last_reading() {
        let summary = summarize(&hourly(&[5.0, 35.4])).unwrap();
        assert_eq!(summary.latest_aqi, 100.0);
        assert_eq!(summary.category, Category::Moderate);
        assert_eq!(summary.pollutants.pm25, 35.4);
        assert_eq!(summary.pollutants.co, 712.46);
        assert_eq!(summary.pollutants.so2, 10.0);
    }

    #[test]
    fn test_single_reading_std_dev_is_zero() {
        let summary = summarize(&hourly(&[40.0])).unwrap();
        assert_eq!(summary.stats.std_dev, 0.0);
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn test_record_uses_city_as_typed_and_plain_label() {
        let summary = summarize(&hourly(&[80.0])).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 11, 3, 12, 0, 0).unwrap();
        let record = summary.to_record("delhi", at);
        assert_eq!(record.city, "delhi");
        assert_eq!(record.category, "Unhealthy");
        assert_eq!(record.aqi, summary.latest_aqi);
        assert_eq!(record.timestamp, at);
    }
}
