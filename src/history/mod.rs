/// Append-only history of search results.
///
/// Every search appends one `AqiRecord`; nothing is ever updated or deleted.
/// Rankings, trends, analytics, comparisons and forecasts read from here.
///
/// The store is always passed explicitly to the operations that use it.
/// Each request opens its own handle and drops it when done.
///
/// Submodules:
/// - `memory` — `Vec`-backed store for tests and database-less runs.
/// - `postgres` — PostgreSQL store over the `aqi_records` table.
/// - `unavailable` — placeholder for a configured database that is down.

pub mod memory;
pub mod postgres;
pub mod unavailable;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AqiRecord, StoreError};

pub use memory::MemoryHistoryStore;
pub use postgres::PostgresHistoryStore;
pub use unavailable::UnavailableHistoryStore;

/// Per-city aggregate over a time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAggregate {
    pub city: String,
    pub avg_aqi: f64,
    pub avg_pm25: f64,
    pub count: usize,
}

/// Query surface of the history log. Every query returns an empty `Vec`
/// when nothing matches.
pub trait HistoryStore {
    fn append(&mut self, record: &AqiRecord) -> Result<(), StoreError>;

    /// Up to `limit` records for `city`, newest first.
    fn recent_for_city(&mut self, city: &str, limit: usize) -> Result<Vec<AqiRecord>, StoreError>;

    /// Records for `city` at or after `since` (all records if `None`),
    /// oldest first.
    fn history_for_city(
        &mut self,
        city: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AqiRecord>, StoreError>;

    /// Up to `limit` records across all cities, newest first.
    fn recent(&mut self, limit: usize) -> Result<Vec<AqiRecord>, StoreError>;

    /// Average AQI, average PM2.5 and count per city for records at or after
    /// `since` (all records if `None`), ordered by average AQI ascending.
    fn city_aggregates(&mut self, since: Option<DateTime<Utc>>) -> Result<Vec<CityAggregate>, StoreError>;
}
