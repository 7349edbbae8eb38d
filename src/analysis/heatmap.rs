/// Latest AQI for each city on the snapshot map.

use serde::Serialize;

use super::stats::round_to;
use super::{live_series, or_logged};
use crate::aqi::{aqi_from_pm25, category_of, Category};
use crate::cities::{MajorCity, CITY_REGISTRY};
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;

/// Shown when a city has neither history nor live data; such points carry
/// `PointOrigin::Default`.
const DEFAULT_AQI: f64 = 50.0;
const DEFAULT_PM25: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointOrigin {
    Stored,
    Live,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub city: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: f64,
    pub pm25: f64,
    pub category: Category,
    pub origin: PointOrigin,
}

/// One point per registry city, in registry order.
pub fn heatmap_snapshot(store: &mut dyn HistoryStore, source: &mut dyn PollutantSource) -> Vec<HeatmapPoint> {
    CITY_REGISTRY.iter().map(|city| city_point(store, source, city)).collect()
}

fn city_point(store: &mut dyn HistoryStore, source: &mut dyn PollutantSource, city: &'static MajorCity) -> HeatmapPoint {
    // A stored label is authoritative; otherwise the tier follows the
    // reported (rounded) AQI.
    let point = |aqi: f64, pm25: f64, label: Option<&str>, origin: PointOrigin| {
        let aqi = round_to(aqi, 2);
        HeatmapPoint {
            city: city.name,
            latitude: city.latitude,
            longitude: city.longitude,
            aqi,
            pm25: round_to(pm25, 2),
            category: label.and_then(Category::from_label).unwrap_or_else(|| category_of(aqi)),
            origin,
        }
    };

    let latest = or_logged(city.name, store.recent_for_city(city.name, 1));
    if let Some(record) = latest.first() {
        return point(record.aqi, record.pm25, Some(record.category.as_str()), PointOrigin::Stored);
    }

    if let Some(reading) = live_series(source, city.name, "Heatmap live fetch").and_then(|s| s.latest().cloned()) {
        return point(aqi_from_pm25(reading.pm25), reading.pm25, None, PointOrigin::Live);
    }

    point(DEFAULT_AQI, DEFAULT_PM25, None, PointOrigin::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::test_support::{record, t0, StubSource};

    #[test]
    fn test_every_registry_city_gets_a_point() {
        let mut store = MemoryHistoryStore::new();
        let mut source = StubSource::failing();
        let points = heatmap_snapshot(&mut store, &mut source);
        assert_eq!(points.len(), CITY_REGISTRY.len());
        assert_eq!(points[0].city, "Delhi");
        for p in &points {
            assert_eq!(p.origin, PointOrigin::Default);
            assert_eq!(p.aqi, 50.0);
            assert_eq!(p.pm25, 25.0);
            assert_eq!(p.category, category_of(p.aqi), "placeholder tier follows its AQI");
        }
    }

    #[test]
    fn test_stored_record_wins_over_live_data() {
        let mut store = MemoryHistoryStore::new();
        store.append(&record("Lahore", 180.0, t0())).unwrap();
        store.append(&record("Lahore", 220.0, t0() + chrono::Duration::hours(1))).unwrap();
        let mut source = StubSource::with_pm25(&[5.0]);
        let points = heatmap_snapshot(&mut store, &mut source);

        let lahore = points.iter().find(|p| p.city == "Lahore").unwrap();
        assert_eq!(lahore.origin, PointOrigin::Stored);
        assert_eq!(lahore.aqi, 220.0, "latest stored record");
        assert_eq!(lahore.category, Category::VeryUnhealthy);

        let delhi = points.iter().find(|p| p.city == "Delhi").unwrap();
        assert_eq!(delhi.origin, PointOrigin::Live);
        assert_eq!(delhi.pm25, 5.0);
        assert_eq!(delhi.category, Category::Good);
        assert_eq!(source.calls, CITY_REGISTRY.len() - 1);
    }
}
