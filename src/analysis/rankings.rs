/// Cities ordered from cleanest to most polluted.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::stats::round_to;
use crate::aqi::{category_of, Category};
use crate::history::{CityAggregate, HistoryStore};
use crate::model::AnalysisError;

/// Preferred window; older history is used only if this one is empty.
pub const RANKING_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    /// 1-based, lowest average AQI first.
    pub rank: usize,
    pub city: String,
    pub aqi: f64,
    pub pm25: f64,
    pub searches: usize,
    pub category: Category,
}

/// Ranks every searched city by average AQI over the last 24 hours, or over
/// all history when nothing was searched in that window.
pub fn rank_cities(store: &mut dyn HistoryStore, now: DateTime<Utc>) -> Result<Vec<Ranking>, AnalysisError> {
    let mut aggregates = store.city_aggregates(Some(now - Duration::hours(RANKING_WINDOW_HOURS)))?;
    if aggregates.is_empty() {
        aggregates = store.city_aggregates(None)?;
    }
    Ok(aggregates.into_iter().enumerate().map(|(i, a)| ranking(i + 1, a)).collect())
}

fn ranking(rank: usize, aggregate: CityAggregate) -> Ranking {
    Ranking {
        rank,
        category: category_of(aggregate.avg_aqi),
        aqi: round_to(aggregate.avg_aqi, 2),
        pm25: round_to(aggregate.avg_pm25, 2),
        searches: aggregate.count,
        city: aggregate.city,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::test_support::{record, t0};

    #[test]
    fn test_recent_window_ranks_ascending() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Lahore", 180.0, t0() - Duration::hours(2))).unwrap();
        store.append(&record("Lahore", 160.0, t0() - Duration::hours(1))).unwrap();
        store.append(&record("Islamabad", 70.0, t0() - Duration::hours(3))).unwrap();
        // Outside the window; must not count.
        store.append(&record("Quetta", 10.0, t0() - Duration::hours(48))).unwrap();

        let rankings = rank_cities(&mut store, t0()).unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[0].city, "Islamabad");
        assert_eq!(rankings[0].category, Category::Moderate);
        assert_eq!(rankings[1].city, "Lahore");
        assert_eq!(rankings[1].aqi, 170.0);
        assert_eq!(rankings[1].searches, 2);
        assert_eq!(rankings[1].category, Category::Unhealthy, "category of the average");
    }

    #[test]
    fn test_empty_window_falls_back_to_all_history() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Quetta", 40.0, t0() - Duration::days(10))).unwrap();
        store.append(&record("Karachi", 120.0, t0() - Duration::days(9))).unwrap();

        let rankings = rank_cities(&mut store, t0()).unwrap();
        let cities: Vec<&str> = rankings.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, vec!["Quetta", "Karachi"]);
        assert_eq!(rankings[1].rank, 2);
    }

    #[test]
    fn test_empty_store_gives_no_rankings() {
        let mut store = MemoryHistoryStore::new();
        assert!(rank_cities(&mut store, t0()).unwrap().is_empty());
    }
}
