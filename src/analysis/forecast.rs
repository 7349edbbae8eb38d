/// Naive 7-day AQI forecast.
///
/// Two paths:
/// - statistical: daily means of the stored history, trailing moving average,
///   flat projection with ±5 jitter and a ±10 band;
/// - live: the current AQI of a fresh series with ±10 jitter and a ±15 band,
///   flagged `demo_mode` so callers can tell it apart.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use super::live_series;
use super::stats::{mean, round_to};
use crate::aqi::{aqi_from_pm25, category_of, Category};
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;
use crate::logging::{self, Component};
use crate::model::{AnalysisError, AqiRecord};

pub const FORECAST_DAYS: i64 = 7;
/// Stored records needed before the statistical path is preferred.
pub const MIN_RECORDS_FOR_HISTORY: usize = 10;
/// Stored records that still allow the statistical path when live data fails.
pub const MIN_RECORDS_FALLBACK: usize = 3;
const MOVING_AVERAGE_DAYS: usize = 7;
const HISTORICAL_DAYS: usize = 30;

const HISTORY_JITTER: f64 = 5.0;
const HISTORY_BAND: f64 = 10.0;
const LIVE_JITTER: f64 = 10.0;
const LIVE_BAND: f64 = 15.0;

const LIVE_NOTE: &str =
    "Forecast based on current AQI. Search city multiple times to build historical data for better predictions.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub aqi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub aqi: f64,
    pub category: Category,
    pub confidence_low: f64,
    pub confidence_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub city: String,
    pub historical: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastPoint>,
    /// True when projected from a single live value rather than history.
    pub demo_mode: bool,
    pub note: Option<String>,
}

pub fn forecast<R: Rng + ?Sized>(
    store: &mut dyn HistoryStore,
    source: &mut dyn PollutantSource,
    city: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Forecast, AnalysisError> {
    let records = store.history_for_city(city, None).unwrap_or_else(|err| {
        logging::warn(Component::Database, Some(city), &format!("History read failed: {}", err));
        Vec::new()
    });

    if records.len() >= MIN_RECORDS_FOR_HISTORY {
        return Ok(from_history(city, &records, rng));
    }

    if let Some(series) = live_series(source, city, "Forecast live fetch") {
        if let Some(latest) = series.latest() {
            let current = aqi_from_pm25(latest.pm25);
            return Ok(from_current(city, current, now.date_naive(), rng));
        }
    }

    if records.len() >= MIN_RECORDS_FALLBACK {
        logging::info(
            Component::Analysis,
            Some(city),
            &format!("Live data unavailable; forecasting from {} stored records", records.len()),
        );
        return Ok(from_history(city, &records, rng));
    }

    Err(AnalysisError::insufficient(
        city,
        format!("No data available for {} to build a forecast.", city),
    ))
}

/// Mean AQI per calendar day (UTC) from the first to the last stored day.
/// Days without records repeat the previous day's value.
///
/// `records` must be ordered oldest first.
pub fn daily_means(records: &[AqiRecord]) -> Vec<(NaiveDate, f64)> {
    let mut days: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for record in records {
        let date = record.timestamp.date_naive();
        match days.last_mut() {
            Some((d, values)) if *d == date => values.push(record.aqi),
            _ => days.push((date, vec![record.aqi])),
        }
    }

    let mut out: Vec<(NaiveDate, f64)> = Vec::new();
    for (date, values) in days {
        if let Some(&(prev_date, prev_value)) = out.last() {
            let mut fill = prev_date + Duration::days(1);
            while fill < date {
                out.push((fill, prev_value));
                fill += Duration::days(1);
            }
        }
        out.push((date, mean(&values)));
    }
    out
}

fn from_history<R: Rng + ?Sized>(city: &str, records: &[AqiRecord], rng: &mut R) -> Forecast {
    let daily = daily_means(records);
    let window = daily.len().min(MOVING_AVERAGE_DAYS);
    let tail: Vec<f64> = daily[daily.len() - window..].iter().map(|(_, v)| *v).collect();
    let last_average = mean(&tail);
    // `records` is non-empty on this path, so `daily` is too.
    let last_date = daily.last().map_or(NaiveDate::MIN, |(d, _)| *d);

    let historical = daily
        .iter()
        .skip(daily.len().saturating_sub(HISTORICAL_DAYS))
        .map(|(date, aqi)| HistoricalPoint {
            date: *date,
            aqi: round_to(*aqi, 2),
        })
        .collect();

    Forecast {
        city: city.to_string(),
        historical,
        forecast: project(last_average, last_date, HISTORY_JITTER, HISTORY_BAND, rng),
        demo_mode: false,
        note: None,
    }
}

fn from_current<R: Rng + ?Sized>(city: &str, current: f64, today: NaiveDate, rng: &mut R) -> Forecast {
    Forecast {
        city: city.to_string(),
        historical: vec![HistoricalPoint {
            date: today,
            aqi: round_to(current, 2),
        }],
        forecast: project(current, today, LIVE_JITTER, LIVE_BAND, rng),
        demo_mode: true,
        note: Some(LIVE_NOTE.to_string()),
    }
}

fn project<R: Rng + ?Sized>(base: f64, from: NaiveDate, jitter: f64, band: f64, rng: &mut R) -> Vec<ForecastPoint> {
    (1..=FORECAST_DAYS)
        .map(|i| {
            let predicted = (base + rng.gen_range(-jitter..=jitter)).max(0.0);
            let aqi = round_to(predicted, 2);
            ForecastPoint {
                date: from + Duration::days(i),
                aqi,
                category: category_of(aqi),
                confidence_low: round_to((predicted - band).max(0.0), 2),
                confidence_high: round_to(predicted + band, 2),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::test_support::{record, t0, StubSource};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(n: i64) -> DateTime<Utc> {
        t0() + Duration::days(n)
    }

    #[test]
    fn test_daily_means_forward_fill_gaps() {
        let records = vec![
            record("Delhi", 100.0, day(0)),
            record("Delhi", 120.0, day(0) + Duration::hours(2)),
            record("Delhi", 80.0, day(3)),
        ];
        let daily = daily_means(&records);
        let values: Vec<f64> = daily.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![110.0, 110.0, 110.0, 80.0]);
        assert_eq!(daily[1].0, day(1).date_naive());
    }

    #[test]
    fn test_history_path_projects_moving_average() {
        let mut store = MemoryHistoryStore::new();
        // Ten days at 100, one record each.
        for n in 0..10 {
            store.append(&record("Delhi", 100.0, day(n))).unwrap();
        }
        let mut source = StubSource::failing();
        let mut rng = StdRng::seed_from_u64(11);
        let result = forecast(&mut store, &mut source, "Delhi", day(10), &mut rng).unwrap();

        assert!(!result.demo_mode);
        assert!(result.note.is_none());
        assert_eq!(source.calls, 0, "ten stored records must not trigger a live fetch");
        assert_eq!(result.historical.len(), 10);
        assert_eq!(result.forecast.len(), 7);
        for (i, point) in result.forecast.iter().enumerate() {
            assert_eq!(point.date, day(9 + i as i64 + 1).date_naive());
            assert!((95.0..=105.0).contains(&point.aqi), "aqi {} outside ±5", point.aqi);
            assert!((point.confidence_high - point.aqi - 10.0).abs() < 0.011);
            assert!((point.aqi - point.confidence_low - 10.0).abs() < 0.011);
        }
    }

    #[test]
    fn test_historical_series_keeps_last_thirty_days() {
        let mut store = MemoryHistoryStore::new();
        for n in 0..40 {
            store.append(&record("Delhi", 50.0 + n as f64, day(n))).unwrap();
        }
        let mut source = StubSource::failing();
        let mut rng = StdRng::seed_from_u64(1);
        let result = forecast(&mut store, &mut source, "Delhi", day(40), &mut rng).unwrap();
        assert_eq!(result.historical.len(), 30);
        assert_eq!(result.historical[0].date, day(10).date_naive());
        // Trailing 7-day mean of 83..=89.
        for point in &result.forecast {
            assert!((81.0..=91.0).contains(&point.aqi), "aqi {}", point.aqi);
        }
    }

    #[test]
    fn test_short_history_uses_live_value_and_flags_demo() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Lahore", 150.0, day(0))).unwrap();
        let mut source = StubSource::with_pm25(&[10.0, 12.0]);
        let mut rng = StdRng::seed_from_u64(5);
        let result = forecast(&mut store, &mut source, "Lahore", day(1), &mut rng).unwrap();

        assert!(result.demo_mode);
        assert!(result.note.is_some());
        assert_eq!(result.historical.len(), 1);
        assert_eq!(result.historical[0].aqi, 50.0, "current AQI comes from the latest PM2.5");
        assert_eq!(result.forecast[0].date, day(2).date_naive());
        for point in &result.forecast {
            assert!((40.0..=60.0).contains(&point.aqi), "aqi {} outside ±10", point.aqi);
            assert!(point.confidence_low >= 0.0);
            assert!((point.confidence_high - point.aqi - 15.0).abs() < 0.011);
        }
    }

    #[test]
    fn test_low_values_never_go_negative() {
        let mut store = MemoryHistoryStore::new();
        let mut source = StubSource::with_pm25(&[0.0]);
        let mut rng = StdRng::seed_from_u64(9);
        let result = forecast(&mut store, &mut source, "Clean", day(0), &mut rng).unwrap();
        for point in &result.forecast {
            assert!(point.aqi >= 0.0);
            assert_eq!(point.confidence_low, 0.0);
        }
    }

    #[test]
    fn test_category_follows_reported_aqi() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = project(50.004, day(0).date_naive(), 0.0, 5.0, &mut rng);
        for point in &points {
            assert_eq!(point.aqi, 50.0);
            assert_eq!(point.category, category_of(50.0));
        }
    }

    #[test]
    fn test_live_failure_falls_back_to_three_stored_records() {
        let mut store = MemoryHistoryStore::new();
        for n in 0..3 {
            store.append(&record("Quetta", 60.0, day(n))).unwrap();
        }
        let mut source = StubSource::failing();
        let mut rng = StdRng::seed_from_u64(2);
        let result = forecast(&mut store, &mut source, "Quetta", day(3), &mut rng).unwrap();
        assert!(!result.demo_mode);
        assert_eq!(source.calls, 1);
        assert_eq!(result.forecast[0].date, day(3).date_naive());
    }

    #[test]
    fn test_no_history_and_no_live_data_is_insufficient() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Quetta", 60.0, day(0))).unwrap();
        let mut source = StubSource::failing();
        let mut rng = StdRng::seed_from_u64(2);
        let err = forecast(&mut store, &mut source, "Quetta", day(1), &mut rng).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
        assert!(err.to_string().contains("search \"Quetta\""));
    }
}
