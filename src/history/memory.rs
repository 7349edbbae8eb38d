/// In-memory history store.

use chrono::{DateTime, Utc};

use super::{CityAggregate, HistoryStore};
use crate::model::{AqiRecord, StoreError};

/// `Vec`-backed store. Records are kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    records: Vec<AqiRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted newest first. Ties keep the later insert first.
    fn newest_first<'a>(records: impl Iterator<Item = &'a AqiRecord>) -> Vec<AqiRecord> {
        let mut out: Vec<AqiRecord> = records.cloned().collect();
        out.reverse();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&mut self, record: &AqiRecord) -> Result<(), StoreError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn recent_for_city(&mut self, city: &str, limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        let mut out = Self::newest_first(self.records.iter().filter(|r| r.city == city));
        out.truncate(limit);
        Ok(out)
    }

    fn history_for_city(
        &mut self,
        city: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AqiRecord>, StoreError> {
        let mut out: Vec<AqiRecord> = self
            .records
            .iter()
            .filter(|r| r.city == city && since.is_none_or(|s| r.timestamp >= s))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(out)
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        let mut out = Self::newest_first(self.records.iter());
        out.truncate(limit);
        Ok(out)
    }

    fn city_aggregates(&mut self, since: Option<DateTime<Utc>>) -> Result<Vec<CityAggregate>, StoreError> {
        // (city, sum aqi, sum pm25, count), first-seen order
        let mut groups: Vec<(String, f64, f64, usize)> = Vec::new();
        for record in self
            .records
            .iter()
            .filter(|r| since.is_none_or(|s| r.timestamp >= s))
        {
            match groups.iter_mut().find(|g| g.0 == record.city) {
                Some(group) => {
                    group.1 += record.aqi;
                    group.2 += record.pm25;
                    group.3 += 1;
                }
                None => groups.push((record.city.clone(), record.aqi, record.pm25, 1)),
            }
        }

        let mut out: Vec<CityAggregate> = groups
            .into_iter()
            .map(|(city, aqi, pm25, count)| CityAggregate {
                city,
                avg_aqi: aqi / count as f64,
                avg_pm25: pm25 / count as f64,
                count,
            })
            .collect();
        out.sort_by(|a, b| a.avg_aqi.total_cmp(&b.avg_aqi));
        Ok(out)
    }
}
