/// Upstream pollutant data.
///
/// The core only sees `PollutantSource`. Live and synthetic series have the
/// same shape; `SourceStatus::origin` tells them apart.
///
/// Submodules:
/// - `openweather` — OpenWeather geocoding + air-pollution forecast client.
/// - `demo` — synthetic series used when the live source is unavailable.

pub mod demo;
pub mod openweather;

use crate::logging;
use crate::model::{FetchedSeries, UpstreamError};

pub use demo::DemoSource;
pub use openweather::OpenWeatherSource;

/// Anything that can produce a pollutant series for a city name.
pub trait PollutantSource {
    fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError>;
}

/// Wraps a live source and substitutes demo data on any failure.
///
/// `fetch` never returns `Err`. There are no retries: one failed call means
/// demo data for that request.
pub struct FallbackSource<S> {
    live: S,
    demo: DemoSource,
}

impl<S: PollutantSource> FallbackSource<S> {
    pub fn new(live: S, demo: DemoSource) -> Self {
        Self { live, demo }
    }

    fn substitute(&mut self, city: &str, reason: String) -> Result<FetchedSeries, UpstreamError> {
        logging::log_fallback(city, &reason);
        self.demo.fetch_with_reason(city, reason)
    }
}

impl<S: PollutantSource> PollutantSource for FallbackSource<S> {
    fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError> {
        match self.live.fetch(city) {
            Ok(series) if !series.is_empty() => Ok(series),
            Ok(_) => self.substitute(city, "No AQI Data Available".to_string()),
            Err(err) => {
                logging::log_upstream_failure(city, "Live AQI fetch", &err);
                self.substitute(city, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SeriesOrigin, SourceStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Failing(UpstreamError);

    impl PollutantSource for Failing {
        fn fetch(&mut self, _city: &str) -> Result<FetchedSeries, UpstreamError> {
            Err(self.0.clone())
        }
    }

    struct Empty;

    impl PollutantSource for Empty {
        fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError> {
            Ok(FetchedSeries {
                readings: Vec::new(),
                status: SourceStatus {
                    resolved_city: city.to_string(),
                    country_code: None,
                    origin: SeriesOrigin::Live,
                },
            })
        }
    }

    fn demo() -> DemoSource {
        DemoSource::new(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_failure_is_replaced_by_flagged_demo_series() {
        let mut source = FallbackSource::new(Failing(UpstreamError::Timeout), demo());
        let series = source.fetch("Lahore").expect("fallback never fails");
        assert_eq!(series.readings.len(), demo::DEMO_HOURS);
        match &series.status.origin {
            SeriesOrigin::Demo { reason } => assert!(reason.contains("timeout"), "reason: {}", reason),
            other => panic!("expected demo origin, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_live_series_is_replaced() {
        let mut source = FallbackSource::new(Empty, demo());
        let series = source.fetch("Lahore").unwrap();
        assert!(!series.is_empty());
        assert!(series.status.origin.is_demo());
    }
}
