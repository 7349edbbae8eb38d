/// PostgreSQL history store.
///
/// One `PostgresHistoryStore` wraps one connection. Callers open it at the
/// start of a request and let it drop at the end; the connection closes on
/// every exit path.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};

use super::{CityAggregate, HistoryStore};
use crate::logging::{self, Component};
use crate::model::{AqiRecord, StoreError};

static SQL_CREATE_AQI_RECORDS: &str = include_str!("../sql/create_aqi_records.sql");

const SELECT_COLUMNS: &str = "city, aqi, pm25, pm10, co, no2, so2, recorded_at, category";

pub struct PostgresHistoryStore {
    client: Client,
}

impl PostgresHistoryStore {
    /// Connects and makes sure the `aqi_records` table exists.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let client = Client::connect(database_url, NoTls)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let mut store = Self { client };
        store.ensure_schema()?;
        logging::debug(Component::Database, None, "History store connection established");
        Ok(store)
    }

    /// Wraps an existing client without touching the schema.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Idempotent; safe to run on every connect.
    pub fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.client.batch_execute(SQL_CREATE_AQI_RECORDS)?;
        Ok(())
    }

    fn row_to_record(row: &Row) -> AqiRecord {
        AqiRecord {
            city: row.get(0),
            aqi: row.get(1),
            pm25: row.get(2),
            pm10: row.get(3),
            co: row.get(4),
            no2: row.get(5),
            so2: row.get(6),
            timestamp: row.get::<_, DateTime<Utc>>(7),
            category: row.get(8),
        }
    }
}

/// `LIMIT` parameters are BIGINT.
fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl HistoryStore for PostgresHistoryStore {
    fn append(&mut self, record: &AqiRecord) -> Result<(), StoreError> {
        self.client.execute(
            "INSERT INTO aqi_records (city, aqi, pm25, pm10, co, no2, so2, recorded_at, category)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                &record.city,
                &record.aqi,
                &record.pm25,
                &record.pm10,
                &record.co,
                &record.no2,
                &record.so2,
                &record.timestamp,
                &record.category,
            ],
        )?;
        Ok(())
    }

    fn recent_for_city(&mut self, city: &str, limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        let query = format!(
            "SELECT {} FROM aqi_records
             WHERE city = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT $2",
            SELECT_COLUMNS
        );
        let rows = self.client.query(query.as_str(), &[&city, &limit_param(limit)])?;
        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    fn history_for_city(
        &mut self,
        city: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AqiRecord>, StoreError> {
        let query = format!(
            "SELECT {} FROM aqi_records
             WHERE city = $1
               AND ($2::timestamptz IS NULL OR recorded_at >= $2)
             ORDER BY recorded_at, id",
            SELECT_COLUMNS
        );
        let rows = self.client.query(query.as_str(), &[&city, &since])?;
        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<AqiRecord>, StoreError> {
        let query = format!(
            "SELECT {} FROM aqi_records
             ORDER BY recorded_at DESC, id DESC
             LIMIT $1",
            SELECT_COLUMNS
        );
        let rows = self.client.query(query.as_str(), &[&limit_param(limit)])?;
        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    fn city_aggregates(&mut self, since: Option<DateTime<Utc>>) -> Result<Vec<CityAggregate>, StoreError> {
        let rows = self.client.query(
            "SELECT city, AVG(aqi) AS avg_aqi, AVG(pm25) AS avg_pm25, COUNT(*) AS searches
             FROM aqi_records
             WHERE ($1::timestamptz IS NULL OR recorded_at >= $1)
             GROUP BY city
             ORDER BY avg_aqi ASC",
            &[&since],
        )?;

        Ok(rows
            .iter()
            .map(|row| CityAggregate {
                city: row.get(0),
                avg_aqi: row.get(1),
                avg_pm25: row.get(2),
                count: usize::try_from(row.get::<_, i64>(3)).unwrap_or(0),
            })
            .collect())
    }
}
