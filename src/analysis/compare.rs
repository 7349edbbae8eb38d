/// Multi-city statistical comparison.

use serde::Serialize;

use super::stats::{anova, pearson, round_to, t_test, Stats, TestOutcome, ALPHA};
use super::{live_series, or_logged};
use crate::aqi::aqi_from_pm25;
use crate::history::HistoryStore;
use crate::ingest::PollutantSource;
use crate::model::AnalysisError;

/// Most recent stored values used per city.
pub const SAMPLE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComparison {
    pub city: String,
    /// `None` when the live lookup failed or the source has no geocoder.
    pub country_code: Option<String>,
    pub current_aqi: f64,
    pub mean_aqi: f64,
    pub median_aqi: f64,
    pub std_aqi: f64,
    pub min_aqi: f64,
    pub max_aqi: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestReport {
    pub cities: [String; 2],
    pub t_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaReport {
    pub f_statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub interpretation: String,
}

/// Pairwise Pearson coefficients; `values[i][j]` pairs `cities[i]` with
/// `cities[j]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub cities: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub comparison: Vec<CityComparison>,
    pub t_test: Option<TTestReport>,
    pub anova: Option<AnovaReport>,
    pub correlation_matrix: CorrelationMatrix,
    pub best_city: Option<String>,
    pub worst_city: Option<String>,
}

struct CitySamples {
    city: String,
    country_code: Option<String>,
    /// Newest first.
    values: Vec<f64>,
}

/// Compares the AQI history of two or more cities.
///
/// Duplicate names collapse onto their first occurrence. Cities with no
/// stored history fall back to a single live sample; cities with neither are
/// reported with zero statistics and excluded from best/worst.
pub fn compare(
    store: &mut dyn HistoryStore,
    source: &mut dyn PollutantSource,
    cities: &[String],
) -> Result<ComparisonResult, AnalysisError> {
    let mut unique: Vec<&str> = Vec::new();
    for city in cities {
        if !unique.contains(&city.as_str()) {
            unique.push(city);
        }
    }
    if unique.len() < 2 {
        return Err(AnalysisError::InvalidInput(
            "Need at least 2 cities to compare".to_string(),
        ));
    }

    let samples: Vec<CitySamples> = unique
        .iter()
        .map(|city| collect_samples(store, source, city))
        .collect();

    let comparison: Vec<CityComparison> = samples.iter().map(city_comparison).collect();

    let t_test = t_test(&samples[0].values, &samples[1].values).map(|outcome| {
        TTestReport {
            cities: [samples[0].city.clone(), samples[1].city.clone()],
            t_statistic: round_to(outcome.statistic, 4),
            p_value: round_to(outcome.p_value, 4),
            significant: outcome.significant,
            interpretation: interpret(&outcome, "Significantly different", "Not significantly different"),
        }
    });

    let anova = if samples.len() > 2 {
        let groups: Vec<&[f64]> = samples.iter().map(|s| s.values.as_slice()).collect();
        anova(&groups).map(|outcome| AnovaReport {
            f_statistic: round_to(outcome.statistic, 4),
            p_value: round_to(outcome.p_value, 4),
            significant: outcome.significant,
            interpretation: interpret(
                &outcome,
                "At least one city is significantly different",
                "No significant difference among cities",
            ),
        })
    } else {
        None
    };

    let correlation_matrix = CorrelationMatrix {
        cities: samples.iter().map(|s| s.city.clone()).collect(),
        values: samples
            .iter()
            .map(|a| {
                samples
                    .iter()
                    .map(|b| round_to(pearson(&a.values, &b.values), 3))
                    .collect()
            })
            .collect(),
    };

    let with_data = || comparison.iter().filter(|c| c.data_points > 0);
    let best_city = with_data()
        .min_by(|a, b| a.mean_aqi.total_cmp(&b.mean_aqi))
        .map(|c| c.city.clone());
    let worst_city = with_data()
        .max_by(|a, b| a.mean_aqi.total_cmp(&b.mean_aqi))
        .map(|c| c.city.clone());

    Ok(ComparisonResult {
        comparison,
        t_test,
        anova,
        correlation_matrix,
        best_city,
        worst_city,
    })
}

/// Every city is looked up live once: the series supplies the country code,
/// and doubles as the single fallback sample when nothing is stored.
fn collect_samples(store: &mut dyn HistoryStore, source: &mut dyn PollutantSource, city: &str) -> CitySamples {
    let live = live_series(source, city, "Comparison live fetch");
    let country_code = live.as_ref().and_then(|series| series.status.country_code.clone());

    let stored = or_logged(city, store.recent_for_city(city, SAMPLE_LIMIT));
    let values = if !stored.is_empty() {
        stored.iter().map(|r| r.aqi).collect()
    } else if let Some(series) = live {
        let pm25 = series.pm25_values();
        vec![aqi_from_pm25(pm25.iter().sum::<f64>() / pm25.len() as f64)]
    } else {
        Vec::new()
    };

    CitySamples {
        city: city.to_string(),
        country_code,
        values,
    }
}

fn city_comparison(samples: &CitySamples) -> CityComparison {
    let stats = Stats::compute(&samples.values).rounded(2);
    CityComparison {
        city: samples.city.clone(),
        country_code: samples.country_code.clone(),
        current_aqi: round_to(samples.values.first().copied().unwrap_or(0.0), 2),
        mean_aqi: stats.mean,
        median_aqi: stats.median,
        std_aqi: stats.std_dev,
        min_aqi: stats.min,
        max_aqi: stats.max,
        data_points: stats.count,
    }
}

fn interpret(outcome: &TestOutcome, significant: &str, not_significant: &str) -> String {
    let verdict = if outcome.significant { significant } else { not_significant };
    format!("{} (α={})", verdict, ALPHA)
}
