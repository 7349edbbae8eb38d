/// Per-day averages over the last week.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::stats::{mean, round_to};
use super::{live_series, or_logged};
use crate::aqi::aqi_from_pm25;
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;
use crate::model::{AqiRecord, FetchedSeries};

pub const TREND_DAYS: i64 = 7;
/// Hourly samples averaged into one synthetic day.
const SAMPLES_PER_SYNTHETIC_DAY: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub aqi: f64,
    pub pm25: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrends {
    pub city: String,
    pub trends: Vec<DailyAverage>,
    /// True when the days were synthesized from a live series.
    pub demo_mode: bool,
}

/// Daily average AQI and PM2.5 for `city` over the last seven days.
///
/// With no stored records in that window the week is synthesized from a
/// live series; if that fails too the result is empty.
pub fn weekly_trends(
    store: &mut dyn HistoryStore,
    source: &mut dyn PollutantSource,
    city: &str,
    now: DateTime<Utc>,
) -> WeeklyTrends {
    let records = or_logged(city, store.history_for_city(city, Some(now - Duration::days(TREND_DAYS))));
    if !records.is_empty() {
        return WeeklyTrends {
            city: city.to_string(),
            trends: stored_daily_averages(&records),
            demo_mode: false,
        };
    }

    match live_series(source, city, "Trends live fetch") {
        Some(series) => WeeklyTrends {
            city: city.to_string(),
            trends: synthetic_week(&series, now.date_naive()),
            demo_mode: true,
        },
        None => WeeklyTrends {
            city: city.to_string(),
            trends: Vec::new(),
            demo_mode: false,
        },
    }
}

/// One entry per calendar day that has records, oldest first.
fn stored_daily_averages(records: &[AqiRecord]) -> Vec<DailyAverage> {
    let mut days: Vec<(NaiveDate, Vec<f64>, Vec<f64>)> = Vec::new();
    for record in records {
        let date = record.timestamp.date_naive();
        match days.last_mut() {
            Some((d, aqi, pm25)) if *d == date => {
                aqi.push(record.aqi);
                pm25.push(record.pm25);
            }
            _ => days.push((date, vec![record.aqi], vec![record.pm25])),
        }
    }
    days.into_iter()
        .map(|(date, aqi, pm25)| DailyAverage {
            date,
            aqi: round_to(mean(&aqi), 2),
            pm25: round_to(mean(&pm25), 2),
        })
        .collect()
}

/// Seven days ending today. Day `i` averages samples `[12i, 12i + 12)`,
/// restarting at the beginning of the series once that runs past the end.
fn synthetic_week(series: &FetchedSeries, today: NaiveDate) -> Vec<DailyAverage> {
    let pm25 = series.pm25_values();
    (0..TREND_DAYS as usize)
        .map(|i| {
            let start = if i * SAMPLES_PER_SYNTHETIC_DAY < pm25.len() {
                i * SAMPLES_PER_SYNTHETIC_DAY
            } else {
                0
            };
            let end = (start + SAMPLES_PER_SYNTHETIC_DAY).min(pm25.len());
            let avg = mean(&pm25[start..end]);
            DailyAverage {
                date: today - Duration::days(TREND_DAYS - 1 - i as i64),
                aqi: round_to(aqi_from_pm25(avg), 2),
                pm25: round_to(avg, 2),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::test_support::{record, t0, StubSource};

    #[test]
    fn test_stored_records_are_averaged_per_day() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Delhi", 100.0, t0() - Duration::days(2))).unwrap();
        store.append(&record("Delhi", 140.0, t0() - Duration::days(2) + Duration::hours(1))).unwrap();
        store.append(&record("Delhi", 90.0, t0() - Duration::hours(1))).unwrap();
        // Older than a week.
        store.append(&record("Delhi", 400.0, t0() - Duration::days(9))).unwrap();

        let mut source = StubSource::failing();
        let result = weekly_trends(&mut store, &mut source, "Delhi", t0());
        assert!(!result.demo_mode);
        assert_eq!(source.calls, 0);
        assert_eq!(result.trends.len(), 2);
        assert_eq!(result.trends[0].date, (t0() - Duration::days(2)).date_naive());
        assert_eq!(result.trends[0].aqi, 120.0);
        assert_eq!(result.trends[0].pm25, 60.0);
        assert_eq!(result.trends[1].aqi, 90.0);
    }

    #[test]
    fn test_empty_history_synthesizes_week_from_live_series() {
        let mut store = MemoryHistoryStore::new();
        // 24 samples: the first two days come from real chunks, the rest wrap to 0.
        let mut pm25 = vec![10.0; 12];
        pm25.extend(vec![30.0; 12]);
        let mut source = StubSource::with_pm25(&pm25);
        let result = weekly_trends(&mut store, &mut source, "Karachi", t0());

        assert!(result.demo_mode);
        assert_eq!(result.trends.len(), 7);
        assert_eq!(result.trends[6].date, t0().date_naive());
        assert_eq!(result.trends[0].date, (t0() - Duration::days(6)).date_naive());
        assert_eq!(result.trends[0].pm25, 10.0);
        assert_eq!(result.trends[1].pm25, 30.0);
        assert_eq!(result.trends[2].pm25, 10.0, "past the end restarts at sample 0");
        assert_eq!(result.trends[1].aqi, round_to(aqi_from_pm25(30.0), 2));
    }

    #[test]
    fn test_no_history_and_no_live_data_is_empty() {
        let mut store = MemoryHistoryStore::new();
        let mut source = StubSource::failing();
        let result = weekly_trends(&mut store, &mut source, "Atlantis", t0());
        assert!(result.trends.is_empty());
        assert!(!result.demo_mode);
    }
}
