/// Air quality monitoring service core.
///
/// Fetches pollutant series for a city, converts PM2.5 to AQI, keeps an
/// append-only history of searches and serves the derived views: current
/// summary, rankings, weekly trends, analytics, multi-city comparison,
/// a naive forecast and a snapshot map.

pub mod analysis;
pub mod aqi;
pub mod cities;
pub mod config;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod search;

#[cfg(test)]
mod test_support;
