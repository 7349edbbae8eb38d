/// Stand-in for a configured database that could not be reached.

use chrono::{DateTime, Utc};

use super::{CityAggregate, HistoryStore};
use crate::model::{AqiRecord, StoreError};

/// Fails every call with the error that prevented opening the real store.
///
/// Searches then report `persisted = false` and read-side aggregations
/// degrade the same way they do for any other store failure.
#[derive(Debug, Clone)]
pub struct UnavailableHistoryStore {
    error: StoreError,
}

impl UnavailableHistoryStore {
    pub fn new(error: StoreError) -> Self {
        Self { error }
    }
}

impl HistoryStore for UnavailableHistoryStore {
    fn append(&mut self, _record: &AqiRecord) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    fn recent_for_city(&mut self, _city: &str, _limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        Err(self.error.clone())
    }

    fn history_for_city(
        &mut self,
        _city: &str,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AqiRecord>, StoreError> {
        Err(self.error.clone())
    }

    fn recent(&mut self, _limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        Err(self.error.clone())
    }

    fn city_aggregates(&mut self, _since: Option<DateTime<Utc>>) -> Result<Vec<CityAggregate>, StoreError> {
        Err(self.error.clone())
    }
}
