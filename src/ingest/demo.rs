/// Demo mode data generation
///
/// When the live API is unavailable, use this module to produce a
/// synthetic week of hourly readings with the same shape as a live
/// forecast, so every downstream view keeps working.

use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::PollutantSource;
use crate::model::{FetchedSeries, PollutantReading, SeriesOrigin, SourceStatus, UpstreamError};

/// 7 days of hourly readings.
pub const DEMO_HOURS: usize = 168;

/// Synthetic series generator. Owns its RNG so tests can seed it.
pub struct DemoSource {
    rng: StdRng,
}

impl DemoSource {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Demo series for `city`, tagged with the reason the live source was
    /// bypassed.
    pub fn fetch_with_reason(&mut self, city: &str, reason: String) -> Result<FetchedSeries, UpstreamError> {
        let start = Utc::now()
            .duration_trunc(Duration::hours(1))
            .unwrap_or_else(|_| Utc::now());
        Ok(FetchedSeries {
            readings: generate_series(start, DEMO_HOURS, &mut self.rng),
            status: SourceStatus {
                resolved_city: city.to_string(),
                country_code: None,
                origin: SeriesOrigin::Demo { reason },
            },
        })
    }
}

impl PollutantSource for DemoSource {
    fn fetch(&mut self, city: &str) -> Result<FetchedSeries, UpstreamError> {
        self.fetch_with_reason(city, "DEMO MODE".to_string())
    }
}

/// `hours` hourly readings starting at `start`.
///
/// PM2.5 is uniform in 20–70 µg/m³ and PM10 tracks it at 1.5×; the gases
/// are independent uniforms.
pub fn generate_series<R: Rng + ?Sized>(start: DateTime<Utc>, hours: usize, rng: &mut R) -> Vec<PollutantReading> {
    (0..hours)
        .map(|i| {
            let pm25 = rng.gen_range(20.0..70.0);
            PollutantReading {
                timestamp: start + Duration::hours(i as i64),
                pm25,
                pm10: pm25 * 1.5,
                co: rng.gen_range(500.0..1000.0),
                no2: rng.gen_range(10.0..30.0),
                so2: rng.gen_range(5.0..15.0),
            }
        })
        .collect()
}
