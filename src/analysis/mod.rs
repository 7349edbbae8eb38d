/// Aggregations served from the history store and the upstream source.
///
/// Every operation takes the store and source it needs as arguments and
/// returns a `Serialize` result whose numbers have already been passed
/// through `stats::finite_or_zero`.
///
/// Submodules:
/// - `stats` — descriptive statistics, trend, t-test, ANOVA, correlation.
/// - `summary` — current-conditions view of one fetched series.
/// - `compare` — multi-city statistical comparison.
/// - `forecast` — naive 7-day projection.
/// - `rankings` — cities ordered by average AQI.
/// - `trends` — per-day averages over the last week.
/// - `analytics` — per-city statistics and pollutant correlations.
/// - `heatmap` — snapshot of the major-city registry.

pub mod analytics;
pub mod compare;
pub mod forecast;
pub mod heatmap;
pub mod rankings;
pub mod stats;
pub mod summary;
pub mod trends;

pub use analytics::{city_analytics, CityAnalytics};
pub use compare::{compare, ComparisonResult};
pub use forecast::{forecast, Forecast};
pub use heatmap::{heatmap_snapshot, HeatmapPoint};
pub use rankings::{rank_cities, Ranking};
pub use summary::{summarize, Summary};
pub use trends::{weekly_trends, WeeklyTrends};

use crate::ingest::PollutantSource;
use crate::logging::{self, Component};
use crate::model::{FetchedSeries, StoreError};

/// Fetches a live series, treating errors and empty series alike as "no
/// data". Errors are logged.
fn live_series(source: &mut dyn PollutantSource, city: &str, operation: &str) -> Option<FetchedSeries> {
    match source.fetch(city) {
        Ok(series) if !series.is_empty() => Some(series),
        Ok(_) => None,
        Err(err) => {
            logging::log_upstream_failure(city, operation, &err);
            None
        }
    }
}

/// Unwraps a store read, logging a failure and substituting the empty value.
fn or_logged<T: Default>(city: &str, result: Result<T, StoreError>) -> T {
    result.unwrap_or_else(|err| {
        logging::warn(
            Component::Database,
            Some(city),
            &format!("History read failed, continuing without it: {}", err),
        );
        T::default()
    })
}
